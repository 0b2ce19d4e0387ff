//! Identifier case conversion shared by the scanner and the generators.

/// Convert a snake_case string to CamelCase.
///
/// `pill_box` -> `PillBox`, `id` -> `Id`
pub fn to_camel_case(s: &str) -> String {
    s.split('_')
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// Convert a Go identifier to snake_case, keeping initialisms together.
///
/// `UserID` -> `user_id`, `HTTPServer` -> `http_server`, `Pill2Box` -> `pill2_box`
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len() + 4);
    for (idx, &ch) in chars.iter().enumerate() {
        if ch.is_uppercase() {
            let prev = idx.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(idx + 1);
            let boundary = match prev {
                Some(p) if p == '_' => false,
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(|n| n.is_lowercase()),
                _ => false,
            };
            if boundary {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}
