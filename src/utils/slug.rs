use chrono::Utc;

/// Transforme un titre d'annonce en slug URL-safe
/// Les diacritiques roumains sont translittérés avant le nettoyage
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_was_dash = true; // évite un '-' en tête

    for c in title.chars() {
        let mapped = match c {
            'ă' | 'â' | 'Ă' | 'Â' => Some('a'),
            'î' | 'Î' => Some('i'),
            'ș' | 'ş' | 'Ș' | 'Ş' => Some('s'),
            'ț' | 'ţ' | 'Ț' | 'Ţ' => Some('t'),
            c if c.is_ascii_alphanumeric() => Some(c.to_ascii_lowercase()),
            _ => None,
        };

        match mapped {
            Some(c) => {
                slug.push(c);
                last_was_dash = false;
            }
            None => {
                if !last_was_dash {
                    slug.push('-');
                    last_was_dash = true;
                }
            }
        }
    }

    // retirer un '-' final
    while slug.ends_with('-') {
        slug.pop();
    }

    if slug.is_empty() {
        slug.push_str("anunt");
    }

    slug
}

/// Suffixe un slug avec le timestamp courant (millisecondes)
/// Utilisé en cas de collision: le slug existant n'est jamais écrasé
pub fn with_timestamp_suffix(base: &str) -> String {
    format!("{}-{}", base, Utc::now().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("iPhone 14 Pro Max"), "iphone-14-pro-max");
    }

    #[test]
    fn test_slugify_romanian_diacritics() {
        assert_eq!(slugify("Mașină de spălat"), "masina-de-spalat");
        assert_eq!(slugify("Cărți în stare bună"), "carti-in-stare-buna");
    }

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("  Garsonieră -- central!!  "), "garsoniera-central");
    }

    #[test]
    fn test_slugify_empty_falls_back() {
        assert_eq!(slugify("!!!"), "anunt");
    }

    #[test]
    fn test_timestamp_suffix_keeps_base() {
        let suffixed = with_timestamp_suffix("iphone-14");
        assert!(suffixed.starts_with("iphone-14-"));
        let suffix = &suffixed["iphone-14-".len()..];
        assert!(suffix.chars().all(|c| c.is_ascii_digit()));
    }
}
