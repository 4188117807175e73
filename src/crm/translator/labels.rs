//! Lookup and upsert of per-language text inside a [`Label`] set.

use crate::crm::translator::model::{Label, LanguageCode, LocalizedLabel};

/// Returns the text stored for `code`, if the set has an entry for it.
pub fn text(label: &Label, code: LanguageCode) -> Option<&str> {
    label
        .localized_labels
        .iter()
        .find(|localized| localized.language_code == code)
        .map(|localized| localized.label.as_str())
}

/// Returns the text for `code`, or the empty string when absent.
pub fn text_or_empty(label: Option<&Label>, code: LanguageCode) -> String {
    label
        .and_then(|label| text(label, code))
        .unwrap_or_default()
        .to_string()
}

/// Replaces the text for `code` in place, or appends a new pair.
///
/// Returns `true` when the stored text changed.
pub fn upsert(label: &mut Label, code: LanguageCode, value: &str) -> bool {
    match label
        .localized_labels
        .iter_mut()
        .find(|localized| localized.language_code == code)
    {
        Some(existing) if existing.label == value => false,
        Some(existing) => {
            existing.label = value.to_string();
            true
        }
        None => {
            label
                .localized_labels
                .push(LocalizedLabel::new(code, value));
            true
        }
    }
}

/// Merges one row's language cells into `label`.
///
/// Blank cells (empty or whitespace only) are skipped unless `allow_blank`
/// is set, in which case they overwrite the stored text with the empty
/// string. Returns `true` when any stored text changed.
pub fn merge_cells<'a, I>(label: &mut Label, cells: I, allow_blank: bool) -> bool
where
    I: IntoIterator<Item = (LanguageCode, &'a str)>,
{
    let mut changed = false;
    for (code, cell) in cells {
        if is_blank(cell) {
            if allow_blank {
                changed |= upsert(label, code, "");
            }
            continue;
        }
        changed |= upsert(label, code, cell);
    }
    changed
}

/// Whether at least one language carries non-empty text.
pub fn has_text(label: Option<&Label>) -> bool {
    label.is_some_and(|label| {
        label
            .localized_labels
            .iter()
            .any(|localized| !localized.label.is_empty())
    })
}

pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lcid(code: u32) -> LanguageCode {
        LanguageCode::new(code).expect("valid lcid")
    }

    #[test]
    fn upsert_replaces_existing_language_in_place() {
        let mut label: Label = [(lcid(1033), "Account".to_string())].into_iter().collect();

        assert!(upsert(&mut label, lcid(1033), "Customer"));
        assert!(!upsert(&mut label, lcid(1033), "Customer"));
        assert_eq!(label.localized_labels.len(), 1);
        assert_eq!(text(&label, lcid(1033)), Some("Customer"));
    }

    #[test]
    fn blank_cells_are_skipped_unless_allowed() {
        let mut label: Label = [(lcid(1033), "Account".to_string())].into_iter().collect();

        let changed = merge_cells(&mut label, [(lcid(1033), ""), (lcid(1036), "Compte")], false);
        assert!(changed);
        assert_eq!(text(&label, lcid(1033)), Some("Account"));
        assert_eq!(text(&label, lcid(1036)), Some("Compte"));

        let changed = merge_cells(&mut label, [(lcid(1033), "  ")], true);
        assert!(changed);
        assert_eq!(text(&label, lcid(1033)), Some(""));
    }

    #[test]
    fn has_text_ignores_empty_entries() {
        let empty: Label = [(lcid(1033), String::new())].into_iter().collect();
        assert!(!has_text(Some(&empty)));
        assert!(!has_text(None));
    }
}
