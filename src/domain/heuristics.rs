//! Legacy text heuristic.
//!
//! The first line item of an order carries a free-text description such as
//! `"IMPLANTACAO DE ABRIGO NA AV BRASIL, 120 BAIRRO CENTRO - PROX. AO
//! TERMINAL"`. Historically the display address, neighborhood and complement
//! persisted on the ledger row were scraped out of that text with fixed
//! markers (`" NA "`, `"BAIRRO"`, `"-"`). This is a best-effort heuristic
//! with a hard fallback to the raw form values, kept separate from the
//! numbering and persistence logic; it must stay byte-compatible with the
//! data already stored, so do not strengthen the parsing here.

/// Text after the last occurrence of `marker` (the whole string when absent)
fn after_last<'a>(text: &'a str, marker: &str) -> &'a str {
    text.rsplit(marker).next().unwrap_or(text)
}

/// Text before the first comma
fn before_comma(text: &str) -> &str {
    text.split(',').next().unwrap_or(text)
}

/// Derive the display address from the first line item's description:
/// everything after the last `" NA "`, up to the first comma.
pub fn display_address(description: &str) -> String {
    before_comma(after_last(description, " NA ")).trim().to_string()
}

/// Derive neighborhood and complement strings.
///
/// The neighborhood comes from the text after the last `"BAIRRO"` marker when
/// present, otherwise from the form value. Either way, a `"-"` inside the
/// neighborhood splits it into neighborhood and complement. The form values
/// are the fallback whenever the markers yield nothing useful.
pub fn neighborhood_and_complement(
    description: &str,
    form_neighborhood: &str,
    form_complement: &str,
) -> (String, String) {
    let mut neighborhood = if description.contains("BAIRRO") {
        before_comma(after_last(description, "BAIRRO")).trim().to_string()
    } else {
        form_neighborhood.to_string()
    };
    let mut complement = form_complement.to_string();

    let split = neighborhood
        .split_once('-')
        .map(|(left, right)| (left.trim().to_string(), right.trim().to_string()));
    if let Some((left, right)) = split {
        neighborhood = left;
        complement = right;
    }

    (neighborhood, complement)
}
