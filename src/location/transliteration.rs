//! Latin/Cyrillic place-name table
//!
//! Customers write place names in Uzbek Latin, English or Russian; the catalogue
//! mixes all three. Each entry maps a lowercase Latin spelling to the Cyrillic
//! form used for matching.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Lowercase Latin spelling and its Cyrillic form, in table order
pub const TRANSLITERATIONS: &[(&str, &str)] = &[
    // Uzbekistan (departure cities)
    ("toshkent", "ташкент"),
    ("tashkent", "ташкент"),
    ("samarqand", "самарканд"),
    ("samarkand", "самарканд"),
    ("buxoro", "бухара"),
    ("bukhara", "бухара"),
    ("xiva", "хива"),
    ("khiva", "хива"),
    ("namangan", "наманган"),
    ("farg'ona", "фергана"),
    ("fergana", "фергана"),
    ("fargona", "фергана"),
    // Countries
    ("turkiya", "турция"),
    ("turkey", "турция"),
    ("turtsiya", "турция"),
    ("o'zbekiston", "узбекистан"),
    ("ozbekiston", "узбекистан"),
    ("uzbekistan", "узбекистан"),
    ("fransiya", "франция"),
    ("france", "франция"),
    ("baa", "оаэ"),
    ("uae", "оаэ"),
    ("emirates", "оаэ"),
    ("misr", "египет"),
    ("egypt", "египет"),
    ("tailand", "таиланд"),
    ("thailand", "таиланд"),
    ("malayziya", "малайзия"),
    ("malaysia", "малайзия"),
    ("indoneziya", "индонезия"),
    ("indonesia", "индонезия"),
    ("maldiv orollari", "мальдивы"),
    ("maldiv", "мальдивы"),
    ("maldives", "мальдивы"),
    ("maldivy", "мальдивы"),
    ("hindiston", "индия"),
    ("india", "индия"),
    ("singapur", "сингапур"),
    ("singapore", "сингапур"),
    ("xitoy", "китай"),
    ("china", "китай"),
    ("kitay", "китай"),
    ("gruziya", "грузия"),
    ("georgia", "грузия"),
    ("vetnam", "вьетнам"),
    ("vietnam", "вьетнам"),
    ("ozarbayjon", "азербайджан"),
    ("azerbayjan", "азербайджан"),
    ("azerbaijan", "азербайджан"),
    ("qatar", "катар"),
    ("katar", "катар"),
    ("ummon sultonligi", "оман"),
    ("ummon", "оман"),
    ("oman", "оман"),
    ("shri lanka", "шри-ланка"),
    ("sri lanka", "шри-ланка"),
    ("qozog'iston", "казахстан"),
    ("qozogiston", "казахстан"),
    ("kazakhstan", "казахстан"),
    ("saudiya arabistoni", "саудовская аравия"),
    ("saudiya", "саудовская аравия"),
    ("saudi arabia", "саудовская аравия"),
    ("yaponiya", "япония"),
    ("japan", "япония"),
    // Turkey
    ("istanbul", "стамбул"),
    ("marmaris", "мармарис"),
    ("kappadokiya", "каппадокия"),
    ("cappadocia", "каппадокия"),
    ("antaliya", "анталья"),
    ("antalya", "анталья"),
    ("bodrum", "бодрум"),
    ("bursa", "бурса"),
    ("dalaman", "даламан"),
    ("anqara", "анкара"),
    ("ankara", "анкара"),
    ("sovg'a", "белек"),
    ("belek", "белек"),
    ("side", "сиде"),
    ("izmir", "измир"),
    ("kushadasi", "кушадасы"),
    ("trabzon", "трабзон"),
    ("kemer", "кемер"),
    ("alanya", "аланья"),
    ("fethiye", "фетхие"),
    // UAE
    ("dubay", "дубай"),
    ("dubai", "дубай"),
    ("abu-dabi", "абу-даби"),
    ("abu dhabi", "абу-даби"),
    ("sharja", "шарджа"),
    ("sharjah", "шарджа"),
    ("ras-al-xayma", "рас-эль-хайма"),
    ("ras al khaimah", "рас-эль-хайма"),
    ("fujeyra", "фуджейра"),
    ("fujairah", "фуджейра"),
    // Thailand
    ("pxuket", "пхукет"),
    ("phuket", "пхукет"),
    ("bangkok", "бангкок"),
    ("pattaya", "паттайя"),
    // Egypt
    ("sharm al-shayx", "шарм-эль-шейх"),
    ("sharm el sheikh", "шарм-эль-шейх"),
    ("hurghada", "хургада"),
    // Malaysia
    ("kuala-lumpur", "куала-лумпур"),
    ("kuala lumpur", "куала-лумпур"),
    ("penang", "пенанг"),
    ("langkawi", "лангкави"),
    ("ari atollari", "атоллы ари"),
    // Indonesia
    ("bali", "бали"),
    ("jakarta", "джакарта"),
    ("gili trawangan", "gili trawangan"),
    ("denpasar", "денпасар"),
    // Maldives
    ("male", "мале"),
    ("bodufoludo", "бодафолуду"),
    ("feridu", "фериду"),
    ("maldiva", "мальдивы"),
    ("todu", "тодду"),
    ("shimoliy male atolli", "north male atoll"),
    ("north male atoll", "north male atoll"),
    // India
    ("goa", "гоа"),
    ("dehli", "дели"),
    ("delhi", "дели"),
    ("mumbay", "мумбаи"),
    ("mumbai", "мумбаи"),
    // China
    ("pekin", "пекин"),
    ("beijing", "пекин"),
    ("shanxay", "шанхай"),
    ("shanghai", "шанхай"),
    ("guanchjou", "гуанчжоу"),
    ("guangzhou", "гуанчжоу"),
    ("xaynan", "хайнань"),
    ("hainan", "хайнань"),
    ("sanya", "санья"),
    // Georgia
    ("tbilisi", "тбилиси"),
    ("borjomi", "borjomi"),
    // Vietnam
    ("fukuok", "фукуок"),
    ("phu quoc", "фукуок"),
    ("nyachang", "нячанг"),
    ("nha trang", "nha trang"),
    ("nha-trang", "нячанг"),
    ("danang", "дананг"),
    ("hoi an", "hoi an"),
    ("kamran", "камрань"),
    // Azerbaijan
    ("baku", "баку"),
    ("naftalan", "нафталан"),
    ("lenkoran", "ленкорань"),
    // Qatar
    ("doha", "доха"),
    ("abu samra", "абу самра"),
    // Oman
    ("maskat", "маскат"),
    ("muscat", "маскат"),
    ("salala", "салала"),
    ("salalah", "салала"),
    // Sri Lanka
    ("shri-lanka", "шри-ланка"),
    ("koggala", "коггала"),
    // Kazakhstan
    ("shymkent", "шымкент"),
    // Saudi Arabia
    ("madina", "медина"),
    ("medina", "медина"),
    ("jidda", "джедда"),
    ("jeddah", "джедда"),
    ("makka", "мекка"),
    ("mecca", "мекка"),
    ("makkah", "мекка"),
    // Japan
    ("tokio", "токио"),
    ("tokyo", "токио"),
    ("fukuoka", "фукуока"),
    // France
    ("parij", "париж"),
    ("paris", "париж"),
];

static FORWARD: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| TRANSLITERATIONS.iter().copied().collect());

// Later spellings overwrite earlier ones, so each Cyrillic form maps back to
// the last Latin key listed for it.
static REVERSE: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    TRANSLITERATIONS
        .iter()
        .map(|&(latin, cyrillic)| (cyrillic, latin))
        .collect()
});

/// Lowercase and trim
pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Spellings to compare for `name`: the normalized text, its Cyrillic form and
/// its Latin form, without duplicates
pub fn variants(name: &str) -> Vec<String> {
    let normalized = normalize(name);
    let mut out = vec![normalized.clone()];

    if let Some(cyrillic) = FORWARD.get(normalized.as_str()) {
        push_unique(&mut out, cyrillic);
    }
    if let Some(latin) = REVERSE.get(normalized.as_str()) {
        push_unique(&mut out, latin);
    }

    out
}

fn push_unique(out: &mut Vec<String>, value: &str) {
    if !out.iter().any(|v| v == value) {
        out.push(value.to_string());
    }
}
