//! Path templates: `/pets/{id}` is registered as `/pets/*`, and a concrete
//! path matches a template segment by segment.

/// Marker that stands in for a path placeholder.
pub const WILDCARD: &str = "*";

/// Replace each `{name}` placeholder of `actual` whose name is in `names` by [`WILDCARD`].
///
/// Names that do not occur in the path are returned as the second element.
pub fn wildcard_name<'a>(
    actual: &str,
    names: impl IntoIterator<Item = &'a str>,
) -> (String, Vec<&'a str>) {
    let mut name = actual.to_string();
    let mut missing = Vec::new();
    for param in names {
        let placeholder = format!("{{{param}}}");
        if name.contains(&placeholder) {
            name = name.replace(&placeholder, WILDCARD);
        } else {
            missing.push(param);
        }
    }
    (name, missing)
}

/// Whether `path` matches `template`. A segment that is exactly `*` matches
/// any non-empty segment; other segments compare case-insensitively. Segment
/// counts must be equal.
pub fn matches(template: &str, path: &str) -> bool {
    let template: Vec<&str> = template.split('/').collect();
    let path: Vec<&str> = path.split('/').collect();
    template.len() == path.len()
        && template
            .iter()
            .zip(&path)
            .all(|(t, p)| segment_matches(t, p))
}

fn segment_matches(template: &str, segment: &str) -> bool {
    if template == WILDCARD {
        !segment.is_empty()
    } else {
        template.eq_ignore_ascii_case(segment)
    }
}

/// Match `path` against `template` and collect the placeholder values, using
/// `actual` (the un-substituted path) to recover placeholder names.
pub fn capture(actual: &str, template: &str, path: &str) -> Option<Vec<(String, String)>> {
    if !matches(template, path) {
        return None;
    }

    let mut captured = Vec::new();
    for ((actual_seg, template_seg), path_seg) in
        actual.split('/').zip(template.split('/')).zip(path.split('/'))
    {
        if template_seg != WILDCARD {
            continue;
        }
        if let Some(name) = actual_seg
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
        {
            captured.push((name.to_string(), path_seg.to_string()));
        }
    }
    Some(captured)
}
