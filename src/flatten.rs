use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::address::{clean_street_name, fraction_building_number};

/// One row of a scanned registry table as read back from CSV.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct ScannedListing {
    #[serde(default)]
    pub borough: Option<String>,
    pub zip: Option<String>,
    pub bldgno1: Option<String>,
    pub street1: Option<String>,
    pub stsufx1: Option<String>,
    pub bldgno2: Option<String>,
    pub street2: Option<String>,
    pub stsufx2: Option<String>,
    pub county: Option<String>,
    pub city: Option<String>,
    pub status1: Option<String>,
    pub status2: Option<String>,
    pub status3: Option<String>,
    pub block: Option<String>,
    pub lot: Option<String>,
}

/// One building address with its registry attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct FlatListing {
    pub borough: Option<String>,
    pub zip: Option<String>,
    pub building_no: String,
    pub street: String,
    pub block: Option<String>,
    pub lot: Option<String>,
    pub county: Option<String>,
    pub city: Option<String>,
    pub status1: Option<String>,
    pub status2: Option<String>,
    pub status3: Option<String>,
}

pub const FLAT_COLUMNS: [&str; 11] = [
    "BOROUGH",
    "ZIP",
    "BUILDING_NO",
    "STREET",
    "BLOCK",
    "LOT",
    "COUNTY",
    "CITY",
    "STATUS1",
    "STATUS2",
    "STATUS3",
];

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|value| value.trim()).filter(|value| !value.is_empty())
}

fn pad_zip(zip: &str) -> String {
    format!("{zip:0>5}")
}

impl ScannedListing {
    fn slots(&self) -> [(Option<&String>, Option<&String>, Option<&String>); 2] {
        [
            (self.bldgno1.as_ref(), self.street1.as_ref(), self.stsufx1.as_ref()),
            (self.bldgno2.as_ref(), self.street2.as_ref(), self.stsufx2.as_ref()),
        ]
    }

    /// Zero, one or two rows: one for each slot with a building number and a street.
    #[must_use]
    pub fn flatten(&self, borough: Option<&str>) -> Vec<FlatListing> {
        let mut out = Vec::new();
        for (bldgno, street, suffix) in self.slots() {
            let (Some(bldgno), Some(street)) = (non_empty(bldgno), non_empty(street)) else {
                continue;
            };

            let building_no = fraction_building_number(bldgno);
            if building_no != bldgno {
                debug!(from = bldgno, to = %building_no, "converted half building number");
            }

            let Some(street) = clean_street_name(Some(street), non_empty(suffix)) else {
                continue;
            };

            out.push(FlatListing {
                borough: borough
                    .map(str::to_string)
                    .or_else(|| non_empty(self.borough.as_ref()).map(str::to_string)),
                zip: non_empty(self.zip.as_ref()).map(pad_zip),
                building_no: building_no.into_owned(),
                street,
                block: self.block.clone(),
                lot: self.lot.clone(),
                county: self.county.clone(),
                city: self.city.clone(),
                status1: self.status1.clone(),
                status2: self.status2.clone(),
                status3: self.status3.clone(),
            });
        }
        out
    }
}

/// Flattens every listing, keeping input order and slot order.
#[must_use]
pub fn flatten_listings(listings: &[ScannedListing], borough: Option<&str>) -> Vec<FlatListing> {
    listings
        .iter()
        .flat_map(|listing| listing.flatten(borough))
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{ScannedListing, flatten_listings, pad_zip};

    fn listing() -> ScannedListing {
        ScannedListing {
            zip: Some("10301".into()),
            bldgno1: Some("142.5".into()),
            street1: Some("BAY ST".into()),
            bldgno2: Some("10".into()),
            street2: Some("W 4TH".into()),
            stsufx2: Some("ST".into()),
            county: Some("RICHMOND".into()),
            city: Some("STATEN ISLAND".into()),
            status1: Some("MULTIPLE DWELLING A".into()),
            block: Some("503".into()),
            lot: Some("12".into()),
            ..ScannedListing::default()
        }
    }

    #[test]
    fn emits_one_row_per_complete_slot() {
        let rows = flatten_listings(&[listing()], Some("Staten Island"));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].building_no, "142 1/2");
        assert_eq!(rows[0].street, "Bay Street");
        assert_eq!(rows[1].building_no, "10");
        assert_eq!(rows[1].street, "West 4th Street");
        assert_eq!(rows[1].borough.as_deref(), Some("Staten Island"));
        assert_eq!(rows[1].block.as_deref(), Some("503"));
    }

    #[test]
    fn skips_slots_missing_number_or_street() {
        let mut scanned = listing();
        scanned.street2 = None;
        scanned.bldgno1 = Some("  ".into());
        assert!(flatten_listings(&[scanned], None).is_empty());
    }

    #[test]
    fn pads_zip_and_falls_back_to_row_borough() {
        let scanned = ScannedListing {
            borough: Some("Manhattan".into()),
            zip: Some("501".into()),
            bldgno1: Some("1".into()),
            street1: Some("MAIN".into()),
            ..ScannedListing::default()
        };
        let rows = flatten_listings(&[scanned], None);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].zip.as_deref(), Some("00501"));
        assert_eq!(rows[0].borough.as_deref(), Some("Manhattan"));
        assert_eq!(pad_zip("10001"), "10001");
    }
}
