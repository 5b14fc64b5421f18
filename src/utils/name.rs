/// Pipeline element names are case-insensitive and stored uppercased.
pub fn trim_and_upper(name: &str) -> String {
    name.trim().to_uppercase()
}

/// Name of the action stored by a combined action and task save.
pub fn custom_action_name(name: &str) -> String {
    format!("CUSTOM {} ACTION", trim_and_upper(name))
}

pub fn custom_task_name(name: &str) -> String {
    format!("CUSTOM {} TASK", trim_and_upper(name))
}

/// Returns `true` if both names refer to the same element.
pub fn same_name(
    a: &str,
    b: &str,
) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// Names that appear more than once, in order of first repetition.
pub fn duplicates<'a, I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut seen: Vec<String> = Vec::new();
    let mut dups: Vec<String> = Vec::new();
    for name in names {
        let normalized = trim_and_upper(name);
        if seen.contains(&normalized) {
            if !dups.contains(&normalized) {
                dups.push(normalized);
            }
        } else {
            seen.push(normalized);
        }
    }
    dups
}
