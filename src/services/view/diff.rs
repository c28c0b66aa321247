use std::collections::{BTreeMap, HashMap};

use crate::codec::{self, NibbleBitmap};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewDiff {
    pub coords: Vec<u32>,
    pub colours: Vec<u8>,
}

impl ViewDiff {
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn encode(&self) -> (Vec<u8>, Vec<u8>) {
        (
            codec::encode_coordinates24(&self.coords),
            codec::encode_colours4(&self.colours),
        )
    }
}

/// Writes the batch into `bitmap` and reports the coordinates whose final colour
/// differs from the colour they had before the batch, in ascending order.
///
/// A coordinate written several times in one batch keeps the last colour.
pub fn apply_batch(bitmap: &mut NibbleBitmap, coords: &[u32], colours: &[u8]) -> ViewDiff {
    let mut previous = HashMap::new();
    let mut current = BTreeMap::new();

    for (&coord, &colour) in coords.iter().zip(colours) {
        let replaced = bitmap.set(coord, colour);
        previous.entry(coord).or_insert(replaced);
        current.insert(coord, colour & 0x0F);
    }

    let mut diff = ViewDiff::default();
    for (coord, colour) in current {
        if previous.get(&coord) != Some(&colour) {
            diff.coords.push(coord);
            diff.colours.push(colour);
        }
    }
    diff
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unchanged_pixels_are_left_out() {
        let mut bitmap = NibbleBitmap::new(4, 4);
        bitmap.set(2, 5);

        let diff = apply_batch(&mut bitmap, &[2, 3], &[5, 7]);

        assert_eq!(diff.coords, vec![3]);
        assert_eq!(diff.colours, vec![7]);
        assert_eq!(bitmap.get(2), 5);
        assert_eq!(bitmap.get(3), 7);
    }

    #[test]
    fn last_write_in_batch_wins() {
        let mut bitmap = NibbleBitmap::new(4, 4);

        let diff = apply_batch(&mut bitmap, &[9, 9, 9], &[1, 2, 0]);

        assert!(diff.is_empty());
        assert_eq!(bitmap.get(9), 0);
    }

    #[test]
    fn padding_colour_is_ignored() {
        let mut bitmap = NibbleBitmap::new(4, 4);
        let colours = codec::decode_colours4(&codec::encode_colours4(&[4]));

        let diff = apply_batch(&mut bitmap, &[1], &colours);

        assert_eq!(diff.coords, vec![1]);
        assert_eq!(bitmap.get(0), 0);
    }

    #[test]
    fn diff_is_sorted_by_coordinate() {
        let mut bitmap = NibbleBitmap::new(4, 4);

        let diff = apply_batch(&mut bitmap, &[12, 3, 7], &[1, 2, 3]);

        assert_eq!(diff.coords, vec![3, 7, 12]);
        assert_eq!(diff.colours, vec![2, 3, 1]);
    }
}
