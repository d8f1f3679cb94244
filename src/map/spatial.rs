use std::collections::HashMap;

use crate::country::CountryFeature;

/// Cell size in degrees for the country index
const CELL_DEGREES: f64 = 10.0;

/// Spatial index over country bounding boxes.
/// Each country is inserted into every cell its bbox overlaps, so lookups
/// never miss a country; false positives are removed by the exact
/// point-in-polygon test.
#[derive(Debug, Default)]
pub struct CountryIndex {
    cells: HashMap<(i32, i32), Vec<usize>>,
    cell_size: f64,
}

impl CountryIndex {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cells: HashMap::new(),
            cell_size,
        }
    }

    /// Index every country by its position in `countries`
    pub fn build(countries: &[CountryFeature]) -> Self {
        let mut index = Self::new(CELL_DEGREES);
        for (position, country) in countries.iter().enumerate() {
            if let Some(bbox) = country.bbox() {
                let min_cell = index.to_cell(bbox.min_lon, bbox.min_lat);
                let max_cell = index.to_cell(bbox.max_lon, bbox.max_lat);
                for y in min_cell.1..=max_cell.1 {
                    for x in min_cell.0..=max_cell.0 {
                        index.cells.entry((x, y)).or_default().push(position);
                    }
                }
            }
        }
        index
    }

    #[inline(always)]
    fn to_cell(&self, lon: f64, lat: f64) -> (i32, i32) {
        let x = (lon / self.cell_size).floor() as i32;
        let y = (lat / self.cell_size).floor() as i32;
        (x, y)
    }

    /// Countries whose bbox may contain (lon, lat), in list order
    #[inline]
    pub fn candidates(&self, lon: f64, lat: f64) -> &[usize] {
        self.cells
            .get(&self.to_cell(lon, lat))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Position of the first country containing (lon, lat)
    pub fn locate(&self, countries: &[CountryFeature], lon: f64, lat: f64) -> Option<usize> {
        self.candidates(lon, lat)
            .iter()
            .copied()
            .find(|&i| countries.get(i).is_some_and(|c| c.contains(lon, lat)))
    }
}
