use crate::contacts::model::Contact;

pub fn find(contacts: &[Contact], uid: u64) -> Option<&Contact> {
    contacts.iter().find(|c| c.uid == uid)
}

/// Contacts whose name, phone or email contains `query` case-insensitively.
/// `query` is expected to be trimmed and lowercased already.
pub fn matching(contacts: &[Contact], query: &str) -> Vec<Contact> {
    contacts
        .iter()
        .filter(|c| {
            [Some(c.name.as_str()), Some(c.phone.as_str()), c.email.as_deref()]
                .into_iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(query))
        })
        .cloned()
        .collect()
}

/// Case-insensitive by name; equal names keep their relative order.
pub fn sorted_by_name(contacts: &[Contact]) -> Vec<Contact> {
    let mut sorted = contacts.to_vec();
    sorted.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    sorted
}
