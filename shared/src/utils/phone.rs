//! Phone number utilities

/// Keep only the ASCII digits of a phone number string
pub fn digits_only(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Mask a phone number for logging, showing only the last 4 digits
///
/// ```
/// use vk_shared::utils::phone::mask_phone_number;
/// assert_eq!(mask_phone_number("+14155550100"), "+*******0100");
/// ```
pub fn mask_phone_number(phone: &str) -> String {
    let len = phone.chars().count();
    if len <= 4 {
        return "*".repeat(len);
    }

    let visible: String = phone.chars().skip(len - 4).collect();
    if let Some(rest) = phone.strip_prefix('+') {
        format!("+{}{}", "*".repeat(rest.chars().count() - 4), visible)
    } else {
        format!("{}{}", "*".repeat(len - 4), visible)
    }
}

/// Mask an email address for logging (e.g. `j***@example.com`)
pub fn mask_email_address(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let first: String = local.chars().take(1).collect();
            format!("{}***@{}", first, domain)
        }
        None => "***".to_string(),
    }
}
