//! Distinguished name helpers
//!
//! Locations are DN fragments such as `OU=Sales,OU=EMEA,` that sit between a
//! user's `CN=` and the base DN. They are always kept with a trailing comma
//! so they can be spliced directly in front of the base DN.
//!
//! A readable form is also supported: `EMEA/Sales` lists OUs root to leaf,
//! and a `!` prefix marks a `CN=` container (`!Users`).

use adbridge_core::DEFAULT_LOCATION;

/// Split a DN into RDN components, honouring `\,` escapes.
pub fn split_dn(dn: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;

    for (i, c) in dn.char_indices() {
        match c {
            '\\' if !escaped => escaped = true,
            ',' if !escaped => {
                parts.push(dn[start..i].trim());
                start = i + 1;
            }
            _ => escaped = false,
        }
    }

    let last = dn[start..].trim();
    if !last.is_empty() {
        parts.push(last);
    }

    parts
}

/// Split `type=value` into its parts.
fn split_rdn(rdn: &str) -> Option<(&str, &str)> {
    rdn.split_once('=').map(|(t, v)| (t.trim(), v.trim()))
}

fn rdn_is(rdn: &str, attr: &str) -> bool {
    split_rdn(rdn)
        .map(|(t, _)| t.eq_ignore_ascii_case(attr))
        .unwrap_or(false)
}

/// Escape an attribute value for use inside a DN (RFC 4514).
pub fn escape_dn_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let last = value.chars().count().saturating_sub(1);

    for (i, c) in value.chars().enumerate() {
        match c {
            ',' | '+' | '"' | '\\' | '<' | '>' | ';' | '=' => {
                out.push('\\');
                out.push(c);
            }
            '#' if i == 0 => out.push_str("\\#"),
            ' ' if i == 0 || i == last => out.push_str("\\ "),
            _ => out.push(c),
        }
    }

    out
}

/// Reverse `escape_dn_value` for single-character escapes.
pub fn unescape_dn_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }

    out
}

/// Normalize a target location into a DN fragment ending in `,`.
///
/// Empty or missing locations map to `CN=Users,`.
pub fn normalize_location(location: Option<&str>) -> String {
    let location = location.map(str::trim).unwrap_or_default();

    if location.is_empty() {
        return DEFAULT_LOCATION.to_string();
    }

    if !location.contains('=') {
        return location_path_to_dn(location);
    }

    if location.ends_with(',') {
        location.to_string()
    } else {
        format!("{},", location)
    }
}

/// `EMEA/Sales` -> `OU=Sales,OU=EMEA,`; `!Users` -> `CN=Users,`
fn location_path_to_dn(path: &str) -> String {
    let rdns: Vec<String> = path
        .split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .rev()
        .map(|segment| match segment.strip_prefix('!') {
            Some(cn) => format!("CN={},", escape_dn_value(cn)),
            None => format!("OU={},", escape_dn_value(segment)),
        })
        .collect();

    if rdns.is_empty() {
        DEFAULT_LOCATION.to_string()
    } else {
        rdns.concat()
    }
}

/// Readable location of an entry.
///
/// Drops the leaf and the `DC=` suffix, lists the rest root to leaf joined
/// by `/`, strips `OU=` and renders `CN=` as `!`.
/// `CN=Jane,OU=Sales,OU=EMEA,DC=corp,DC=com` -> `EMEA/Sales`.
/// An entry directly under the base DN yields `!`.
pub fn location_from_dn(dn: &str) -> String {
    let containers: Vec<String> = split_dn(dn)
        .into_iter()
        .take_while(|rdn| !rdn_is(rdn, "dc"))
        .skip(1)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .map(|rdn| match split_rdn(rdn) {
            Some((t, v)) if t.eq_ignore_ascii_case("cn") => format!("!{}", unescape_dn_value(v)),
            Some((t, v)) if t.eq_ignore_ascii_case("ou") => unescape_dn_value(v),
            _ => rdn.to_string(),
        })
        .collect();

    if containers.is_empty() {
        "!".to_string()
    } else {
        containers.join("/")
    }
}

/// Base DN with every `dc=` label written as `DC=`.
pub fn uppercase_dc(base_dn: &str) -> String {
    split_dn(base_dn)
        .into_iter()
        .map(|rdn| match split_rdn(rdn) {
            Some((t, v)) if t.eq_ignore_ascii_case("dc") => format!("DC={}", v),
            _ => rdn.to_string(),
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// `CN=<cn>,<location><base DN>`; `location` must be normalized.
pub fn user_dn(common_name: &str, location: &str, base_dn: &str) -> String {
    format!(
        "CN={},{}{}",
        escape_dn_value(common_name),
        location,
        uppercase_dc(base_dn)
    )
}

/// Same DN with the leaf replaced by `CN=<cn>`.
pub fn rename_leaf(dn: &str, common_name: &str) -> String {
    let parts = split_dn(dn);
    let leaf = format!("CN={}", escape_dn_value(common_name));

    if parts.len() <= 1 {
        return leaf;
    }

    let mut renamed = Vec::with_capacity(parts.len());
    renamed.push(leaf.as_str());
    renamed.extend_from_slice(&parts[1..]);
    renamed.join(",")
}

/// Split a DN into its leaf RDN and parent DN.
pub fn leaf_and_parent(dn: &str) -> (String, Option<String>) {
    let parts = split_dn(dn);
    match parts.split_first() {
        Some((leaf, rest)) if !rest.is_empty() => (leaf.to_string(), Some(rest.join(","))),
        Some((leaf, _)) => (leaf.to_string(), None),
        None => (String::new(), None),
    }
}

/// Unescaped value of the leaf RDN.
pub fn leaf_value(dn: &str) -> Option<String> {
    split_dn(dn)
        .first()
        .and_then(|rdn| split_rdn(rdn))
        .map(|(_, v)| unescape_dn_value(v))
}

/// Compare two DNs ignoring case and spacing around separators.
pub fn dn_eq(a: &str, b: &str) -> bool {
    let a = split_dn(a);
    let b = split_dn(b);
    a.len() == b.len()
        && a.iter().zip(b.iter()).all(|(x, y)| {
            match (split_rdn(x), split_rdn(y)) {
                (Some((tx, vx)), Some((ty, vy))) => {
                    tx.eq_ignore_ascii_case(ty) && vx.eq_ignore_ascii_case(vy)
                }
                _ => x.eq_ignore_ascii_case(y),
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_location() {
        assert_eq!(normalize_location(None), "CN=Users,");
        assert_eq!(normalize_location(Some("")), "CN=Users,");
        assert_eq!(normalize_location(Some("   ")), "CN=Users,");
        assert_eq!(normalize_location(Some("OU=Sales")), "OU=Sales,");
        assert_eq!(normalize_location(Some("OU=Sales,")), "OU=Sales,");
        assert_eq!(
            normalize_location(Some("OU=Sales,OU=EMEA")),
            "OU=Sales,OU=EMEA,"
        );
    }

    #[test]
    fn test_normalize_location_path() {
        assert_eq!(normalize_location(Some("EMEA/Sales")), "OU=Sales,OU=EMEA,");
        assert_eq!(normalize_location(Some("!Users")), "CN=Users,");
        assert_eq!(normalize_location(Some("/")), "CN=Users,");
    }

    #[test]
    fn test_location_from_dn() {
        assert_eq!(
            location_from_dn("CN=Jane,OU=Sales,OU=EMEA,DC=corp,DC=com"),
            "EMEA/Sales"
        );
        assert_eq!(location_from_dn("CN=Jane,CN=Users,DC=corp,DC=com"), "!Users");
        assert_eq!(location_from_dn("CN=Jane,DC=corp,DC=com"), "!");
        assert_eq!(
            location_from_dn("cn=jane,ou=sales,dc=corp,dc=com"),
            "sales"
        );
    }

    #[test]
    fn test_location_round_trips_through_normalize() {
        let dn = "CN=Jane,OU=Sales,OU=EMEA,DC=corp,DC=com";
        assert_eq!(
            normalize_location(Some(&location_from_dn(dn))),
            "OU=Sales,OU=EMEA,"
        );
    }

    #[test]
    fn test_split_dn_with_escapes() {
        let parts = split_dn(r"CN=Doe\, Jane,OU=Sales,DC=corp,DC=com");
        assert_eq!(parts, vec![r"CN=Doe\, Jane", "OU=Sales", "DC=corp", "DC=com"]);
        assert_eq!(leaf_value(r"CN=Doe\, Jane,OU=Sales").as_deref(), Some("Doe, Jane"));
    }

    #[test]
    fn test_user_dn_uppercases_base() {
        assert_eq!(
            user_dn("Jane Doe", "OU=Sales,", "dc=corp,dc=com"),
            "CN=Jane Doe,OU=Sales,DC=corp,DC=com"
        );
        assert_eq!(
            user_dn("Doe, Jane", "CN=Users,", "DC=corp,DC=com"),
            r"CN=Doe\, Jane,CN=Users,DC=corp,DC=com"
        );
    }

    #[test]
    fn test_rename_leaf() {
        assert_eq!(
            rename_leaf("CN=Jane,OU=Sales,DC=corp,DC=com", "Jane Smith"),
            "CN=Jane Smith,OU=Sales,DC=corp,DC=com"
        );
    }

    #[test]
    fn test_leaf_and_parent() {
        let (leaf, parent) = leaf_and_parent("CN=Jane,OU=Sales,DC=corp,DC=com");
        assert_eq!(leaf, "CN=Jane");
        assert_eq!(parent.as_deref(), Some("OU=Sales,DC=corp,DC=com"));
    }

    #[test]
    fn test_dn_eq() {
        assert!(dn_eq(
            "CN=Jane,OU=Sales,DC=corp,DC=com",
            "cn=jane, ou=sales, dc=corp, dc=com"
        ));
        assert!(!dn_eq("CN=Jane,DC=corp,DC=com", "CN=John,DC=corp,DC=com"));
    }

    #[test]
    fn test_escape_round_trip() {
        let value = " #Doe, Jane+1 ";
        assert_eq!(unescape_dn_value(&escape_dn_value(value)), value);
    }
}
