//! Static registry of marketplace sites (one per country).

/// A country-specific marketplace instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Site {
    pub id: &'static str,
    /// Authorization endpoint for the OAuth flow on this site.
    pub url: &'static str,
    pub name: &'static str,
}

/// Site targeted by a client unless configured otherwise.
pub const DEFAULT_SITE_ID: &str = "MLA";

pub static SITES: &[Site] = &[
    site("MLB", "https://auth.mercadolivre.com.br", "Brasil"),
    site("MCO", "https://auth.mercadolibre.com.co", "Colombia"),
    site("MEC", "https://auth.mercadolibre.com.ec", "Ecuador"),
    site("MHN", "https://auth.mercadolibre.com.ho", "Honduras"),
    site("MPE", "https://auth.mercadolibre.com.pe", "Perú"),
    site("MLM", "https://auth.mercadolibre.com.mx", "Mexico"),
    site("MNI", "https://auth.mercadolibre.com.nc", "Nicaragua"),
    site("MPT", "https://auth.mercadolibre.com.pt", "Portugal"),
    site("MLV", "https://auth.mercadolibre.com.ve", "Venezuela"),
    site("MRD", "https://auth.mercadolibre.com.do", "Dominicana"),
    site("MLC", "https://auth.mercadolibre.cl", "Chile"),
    site("MCR", "https://auth.mercadolibre.com.cr", "Costa Rica"),
    site("MBO", "https://auth.mercadolibre.com.bo", "Bolivia"),
    site("MSV", "https://auth.mercadolibre.com.sl", "El Salvador"),
    site("MPY", "https://auth.mercadolibre.com.py", "Paraguay"),
    site("MCU", "https://auth.mercadolibre.com.cu", "Cuba"),
    site("MGT", "https://auth.mercadolibre.com.gm", "Guatemala"),
    site("MLA", "https://auth.mercadolibre.com.ar", "Argentina"),
    site("MPA", "https://auth.mercadolibre.com.pa", "Panamá"),
    site("MLU", "https://auth.mercadolibre.com.uy", "Uruguay"),
];

const fn site(id: &'static str, url: &'static str, name: &'static str) -> Site {
    Site { id, url, name }
}

/// Look up a site by its exact id (e.g. `"MLA"`).
pub fn find(id: &str) -> Option<&'static Site> {
    SITES.iter().find(|s| s.id == id)
}
