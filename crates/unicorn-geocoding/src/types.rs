use serde::Deserialize;

/// A forward search hit: free-text query resolved to a point
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardPlace {
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: String,
}

/// A reverse lookup result: coordinates resolved to address components
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReversePlace {
    pub display_name: String,
    pub address: ReverseAddress,
}

/// Address components returned by Nominatim's reverse endpoint.
///
/// All fields are optional; which ones are present depends on the zoom
/// level and what OpenStreetMap knows about the location.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ReverseAddress {
    pub country: Option<String>,
    pub state: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub municipality: Option<String>,
    pub county: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReverseResponse {
    pub(crate) display_name: Option<String>,
    pub(crate) address: Option<ReverseAddress>,
    pub(crate) error: Option<String>,
}

/// One entry of the `/search` result list. Nominatim serializes
/// coordinates as strings here.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchResult {
    pub(crate) lat: String,
    pub(crate) lon: String,
    pub(crate) display_name: String,
}
