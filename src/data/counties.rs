/// Liste statique des județe (+ București)
/// Sert à valider le champ county des annonces, la ville reste libre
pub const COUNTIES: [&str; 42] = [
    "Alba",
    "Arad",
    "Argeș",
    "Bacău",
    "Bihor",
    "Bistrița-Năsăud",
    "Botoșani",
    "Brașov",
    "Brăila",
    "București",
    "Buzău",
    "Caraș-Severin",
    "Călărași",
    "Cluj",
    "Constanța",
    "Covasna",
    "Dâmbovița",
    "Dolj",
    "Galați",
    "Giurgiu",
    "Gorj",
    "Harghita",
    "Hunedoara",
    "Ialomița",
    "Iași",
    "Ilfov",
    "Maramureș",
    "Mehedinți",
    "Mureș",
    "Neamț",
    "Olt",
    "Prahova",
    "Satu Mare",
    "Sălaj",
    "Sibiu",
    "Suceava",
    "Teleorman",
    "Timiș",
    "Tulcea",
    "Vaslui",
    "Vâlcea",
    "Vrancea",
];

/// Vérifie qu'un județ fait partie de la liste (insensible à la casse)
pub fn is_valid_county(county: &str) -> bool {
    let needle = county.trim();
    COUNTIES
        .iter()
        .any(|c| c.eq_ignore_ascii_case(needle) || *c == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_county() {
        assert!(is_valid_county("Cluj"));
        assert!(is_valid_county("cluj"));
        assert!(is_valid_county("București"));
    }

    #[test]
    fn test_unknown_county() {
        assert!(!is_valid_county("Atlantis"));
        assert!(!is_valid_county(""));
    }
}
