//! Named regions and the self-reordering index used to look them up.
//!
//! Consecutive samples of a location history almost always fall in the same
//! country. [`RegionIndex`] exploits that by moving every matched region to
//! the front of its list, so the next lookup tests the most recent country
//! first.

use geo::{Coord, Rect};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::ContainmentError;
use crate::geometry::RegionGeometry;

/// A named area, e.g. a country, with its boundary geometry.
#[derive(Debug, Clone)]
pub struct Region {
    name: String,
    geometry: RegionGeometry,
    /// Closed bounding rectangle of all vertices
    envelope: Option<Rect>,
}

impl Region {
    pub fn new(name: impl Into<String>, geometry: RegionGeometry) -> Self {
        let envelope = geometry.envelope();
        Self {
            name: name.into(),
            geometry,
            envelope,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn geometry(&self) -> &RegionGeometry {
        &self.geometry
    }

    /// Check whether the region contains `point`.
    ///
    /// Points above, below or east of the bounding rectangle are rejected
    /// without a winding scan; no edge can count there. West of the
    /// rectangle a downward edge ending at the point's latitude still
    /// counts, so those points always get the full scan.
    pub fn contains(&self, point: Coord) -> Result<bool, ContainmentError> {
        if let Some(envelope) = &self.envelope {
            let (min, max) = (envelope.min(), envelope.max());
            if point.y < min.y || point.y > max.y || point.x > max.x {
                return Ok(false);
            }
        }
        self.geometry.contains(point)
    }
}

/// Which region wins when more than one contains the point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchPolicy {
    /// Scan the whole list and keep the last match.
    #[default]
    LastMatch,
    /// Stop at the first match.
    FirstMatch,
}

/// Ordered collection of regions with move-to-front promotion.
///
/// Regions are assumed not to overlap. The index is mutated by every
/// successful lookup, so it must be owned by a single consumer.
#[derive(Debug, Clone, Default)]
pub struct RegionIndex {
    regions: Vec<Region>,
    policy: MatchPolicy,
    classifications: u64,
}

impl RegionIndex {
    pub fn new(regions: Vec<Region>) -> Self {
        Self::with_policy(regions, MatchPolicy::default())
    }

    pub fn with_policy(regions: Vec<Region>, policy: MatchPolicy) -> Self {
        Self {
            regions,
            policy,
            classifications: 0,
        }
    }

    /// Find the region containing `point` and promote it to the front.
    ///
    /// After a match at position `i` the order becomes
    /// `[matched, regions[..i], regions[i + 1..]]`. Regions whose geometry
    /// cannot be classified are skipped as non-matching.
    ///
    /// # Example
    /// ```
    /// use country_timeline::{Polygon, Region, RegionGeometry, RegionIndex, Ring};
    ///
    /// let unit = |x: f64| RegionGeometry::Polygon(Polygon::new(vec![Ring::from_xy(&[
    ///     (x, 0.0), (x, 1.0), (x + 1.0, 1.0), (x + 1.0, 0.0),
    /// ])]));
    /// let mut index = RegionIndex::new(vec![Region::new("A", unit(0.0)), Region::new("B", unit(2.0))]);
    ///
    /// let found = index.find_containing(geo::coord! { x: 2.5, y: 0.5 }).unwrap();
    /// assert_eq!(found.name(), "B");
    /// assert_eq!(index.names().collect::<Vec<_>>(), ["B", "A"]);
    /// ```
    pub fn find_containing(&mut self, point: Coord) -> Result<&Region, ContainmentError> {
        let mut found = None;

        for (i, region) in self.regions.iter().enumerate() {
            self.classifications += 1;
            match region.contains(point) {
                Ok(true) => {
                    found = Some(i);
                    if self.policy == MatchPolicy::FirstMatch {
                        break;
                    }
                }
                Ok(false) => {}
                Err(e) => {
                    debug!("[RegionIndex] Skipping {}: {}", region.name, e);
                }
            }
        }

        let idx = found.ok_or(ContainmentError::RegionNotFound)?;
        self.regions[..=idx].rotate_right(1);
        Ok(&self.regions[0])
    }

    /// Region names in current scan order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.regions.iter().map(|r| r.name())
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// Total number of region tests performed by lookups so far.
    pub fn classifications(&self) -> u64 {
        self.classifications
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

impl From<Vec<Region>> for RegionIndex {
    fn from(regions: Vec<Region>) -> Self {
        Self::new(regions)
    }
}

impl FromIterator<Region> for RegionIndex {
    fn from_iter<I: IntoIterator<Item = Region>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Polygon, Ring};
    use geo::coord;

    fn square(name: &str, x: f64, y: f64, size: f64) -> Region {
        Region::new(
            name,
            RegionGeometry::Polygon(Polygon::new(vec![Ring::from_xy(&[
                (x, y),
                (x, y + size),
                (x + size, y + size),
                (x + size, y),
            ])])),
        )
    }

    /// Four unit squares in a row along the x axis.
    fn row_index(policy: MatchPolicy) -> RegionIndex {
        RegionIndex::with_policy(
            vec![
                square("A", 0.0, 0.0, 1.0),
                square("B", 2.0, 0.0, 1.0),
                square("C", 4.0, 0.0, 1.0),
                square("D", 6.0, 0.0, 1.0),
            ],
            policy,
        )
    }

    #[test]
    fn test_match_is_promoted_to_front() {
        let mut index = row_index(MatchPolicy::LastMatch);

        let found = index.find_containing(coord! { x: 4.5, y: 0.5 }).unwrap();
        assert_eq!(found.name(), "C");
        assert_eq!(index.names().collect::<Vec<_>>(), ["C", "A", "B", "D"]);

        index.find_containing(coord! { x: 6.5, y: 0.5 }).unwrap();
        assert_eq!(index.names().collect::<Vec<_>>(), ["D", "C", "A", "B"]);
    }

    #[test]
    fn test_repeat_lookup_keeps_order() {
        let mut index = row_index(MatchPolicy::LastMatch);
        index.find_containing(coord! { x: 2.5, y: 0.5 }).unwrap();
        let order: Vec<String> = index.names().map(String::from).collect();

        index.find_containing(coord! { x: 2.6, y: 0.4 }).unwrap();
        assert_eq!(index.names().collect::<Vec<_>>(), order);
        assert_eq!(index.regions()[0].name(), "B");
    }

    #[test]
    fn test_first_match_hits_front_after_promotion() {
        let mut index = row_index(MatchPolicy::FirstMatch);

        index.find_containing(coord! { x: 6.5, y: 0.5 }).unwrap();
        assert_eq!(index.classifications(), 4);

        // Same region again: only the promoted front entry is tested
        index.find_containing(coord! { x: 6.2, y: 0.8 }).unwrap();
        assert_eq!(index.classifications(), 5);
    }

    #[test]
    fn test_last_match_scans_whole_list() {
        let mut index = row_index(MatchPolicy::LastMatch);
        index.find_containing(coord! { x: 0.5, y: 0.5 }).unwrap();
        assert_eq!(index.classifications(), 4);
    }

    #[test]
    fn test_overlap_resolution_depends_on_policy() {
        let overlapping = || {
            vec![
                square("Outer", 0.0, 0.0, 10.0),
                square("Middle", 1.0, 1.0, 8.0),
                square("Elsewhere", 20.0, 20.0, 1.0),
            ]
        };
        let p = coord! { x: 5.0, y: 5.0 };

        let mut last = RegionIndex::with_policy(overlapping(), MatchPolicy::LastMatch);
        assert_eq!(last.find_containing(p).unwrap().name(), "Middle");
        assert_eq!(last.names().collect::<Vec<_>>(), ["Middle", "Outer", "Elsewhere"]);

        let mut first = RegionIndex::with_policy(overlapping(), MatchPolicy::FirstMatch);
        assert_eq!(first.find_containing(p).unwrap().name(), "Outer");
        assert_eq!(first.names().collect::<Vec<_>>(), ["Outer", "Middle", "Elsewhere"]);
    }

    #[test]
    fn test_not_found_leaves_order_untouched() {
        let mut index = row_index(MatchPolicy::LastMatch);
        index.find_containing(coord! { x: 4.5, y: 0.5 }).unwrap();

        let result = index.find_containing(coord! { x: 1.5, y: 0.5 });
        assert!(matches!(result, Err(ContainmentError::RegionNotFound)));
        assert_eq!(index.names().collect::<Vec<_>>(), ["C", "A", "B", "D"]);
    }

    #[test]
    fn test_empty_index() {
        let mut index = RegionIndex::default();
        assert!(index.is_empty());
        assert!(index.find_containing(coord! { x: 0.0, y: 0.0 }).is_err());
    }

    #[test]
    fn test_broken_regions_are_skipped() {
        let mut index: RegionIndex = vec![
            Region::new("Line", RegionGeometry::Unsupported("LineString".into())),
            Region::new("Empty", RegionGeometry::Polygon(Polygon::new(vec![]))),
            square("Valid", 0.0, 0.0, 1.0),
        ]
        .into_iter()
        .collect();

        let found = index.find_containing(coord! { x: 0.5, y: 0.5 }).unwrap();
        assert_eq!(found.name(), "Valid");
        assert_eq!(index.names().collect::<Vec<_>>(), ["Valid", "Line", "Empty"]);
    }

    #[test]
    fn test_envelope_rejects_without_error() {
        let degenerate = Region::new(
            "Sliver",
            RegionGeometry::Polygon(Polygon::new(vec![Ring::from_xy(&[(0.0, 0.0), (1.0, 1.0)])])),
        );
        assert_eq!(degenerate.contains(coord! { x: 5.0, y: 5.0 }), Ok(false));
        assert_eq!(degenerate.contains(coord! { x: 0.5, y: 2.0 }), Ok(false));
        assert!(degenerate.contains(coord! { x: 0.5, y: 0.5 }).is_err());
        // West of the envelope the scan still runs
        assert!(degenerate.contains(coord! { x: -5.0, y: 0.5 }).is_err());
    }

    #[test]
    fn test_envelope_agrees_with_winding_scan_west_of_box() {
        // Downward edge (2,1) -> (3,0) ends on the point's latitude
        let geometry = RegionGeometry::Polygon(Polygon::new(vec![Ring::from_xy(&[
            (1.0, 0.0),
            (2.0, 1.0),
            (3.0, 0.0),
        ])]));
        let point = coord! { x: 0.0, y: 0.0 };
        let expected = geometry.contains(point).unwrap();
        assert!(expected);

        let region = Region::new("Tent", geometry);
        assert_eq!(region.contains(point), Ok(expected));

        let mut index = RegionIndex::new(vec![region]);
        assert_eq!(index.find_containing(point).unwrap().name(), "Tent");
    }

    #[test]
    fn test_envelope_matches_winding_scan_around_box() {
        let geometry = RegionGeometry::Polygon(Polygon::new(vec![Ring::from_xy(&[
            (1.0, 0.0),
            (2.0, 1.0),
            (3.0, 0.0),
        ])]));
        let region = Region::new("Tent", geometry.clone());

        for x in [-1.0, 0.0, 1.0, 1.5, 2.0, 3.0, 4.0] {
            for y in [-1.0, 0.0, 0.5, 1.0, 2.0] {
                let p = coord! { x: x, y: y };
                assert_eq!(region.contains(p), geometry.contains(p), "at ({}, {})", x, y);
            }
        }
    }
}
