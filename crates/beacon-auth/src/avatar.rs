use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;

/// Generates the minimal flat-design placeholder avatar as a base64 SVG
/// data URI. The seed is reserved for per-user color variation later; for
/// now every account gets the same monochrome mark.
pub fn default_avatar(_seed: &str) -> String {
    let bg = "#f0f0f0";
    let fg = "#b4b4b4";

    let svg = format!(
        r##"<svg width="200" height="200" viewBox="0 0 24 24" fill="none" xmlns="http://www.w3.org/2000/svg">
  <rect width="24" height="24" fill="{bg}"/>
  <circle cx="12" cy="8" r="3.5" fill="{fg}"/>
  <path d="M12 13C7.58172 13 4 16.5817 4 21V24H20V21C20 16.5817 16.4183 13 12 13Z" fill="{fg}"/>
</svg>"##
    );

    format!("data:image/svg+xml;base64,{}", B64.encode(svg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn avatar_is_a_svg_data_uri() {
        let uri = default_avatar("ada");
        assert!(uri.starts_with("data:image/svg+xml;base64,"));

        let payload = uri.strip_prefix("data:image/svg+xml;base64,").unwrap();
        let decoded = B64.decode(payload).unwrap();
        let svg = String::from_utf8(decoded).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
    }
}
