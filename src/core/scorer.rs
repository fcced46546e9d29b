use super::error::MatchError;
use super::signature::Signature;

/// Histogram intersection of two signatures.
///
/// Sums `min(count_a, count_b)` over every color of `a`. Both signatures must
/// cover the same number of pixels, otherwise `DimensionMismatch` is returned.
pub fn score(a: &Signature, b: &Signature) -> Result<u64, MatchError> {
    let mut total_a = 0u64;
    let mut in_common = 0u64;

    for (key, &ct_a) in a.iter() {
        in_common += ct_a.min(b.count(key));
        total_a += ct_a;
    }

    let total_b: u64 = b.iter().map(|(_, ct)| *ct).sum();

    if total_a != total_b {
        return Err(MatchError::DimensionMismatch {
            left: total_a,
            right: total_b,
        });
    }

    Ok(in_common)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn sig_from(width: u32, height: u32, f: impl Fn(u32, u32) -> [u8; 3]) -> Signature {
        let img = RgbImage::from_fn(width, height, |x, y| Rgb(f(x, y)));
        Signature::build(&img)
    }

    #[test]
    fn test_self_match_is_total() {
        let sig = sig_from(6, 4, |x, y| [(x * 11) as u8, (y * 7) as u8, ((x + y) % 3) as u8]);
        assert_eq!(score(&sig, &sig).unwrap(), 24);
    }

    #[test]
    fn test_partial_overlap() {
        // [red, red] vs [red, blue]
        let a = sig_from(2, 1, |_, _| [255, 0, 0]);
        let b = sig_from(2, 1, |x, _| if x == 0 { [255, 0, 0] } else { [0, 0, 255] });
        assert_eq!(score(&a, &b).unwrap(), 1);
    }

    #[test]
    fn test_disjoint_scores_zero() {
        let a = sig_from(3, 3, |_, _| [0, 0, 0]);
        let b = sig_from(3, 3, |_, _| [255, 255, 255]);
        assert_eq!(score(&a, &b).unwrap(), 0);
    }

    #[test]
    fn test_symmetric() {
        let a = sig_from(5, 2, |x, y| [(x % 2) as u8 * 100, y as u8, 0]);
        let b = sig_from(5, 2, |x, _| [(x % 3) as u8 * 50, 0, 0]);
        assert_eq!(score(&a, &b).unwrap(), score(&b, &a).unwrap());
    }

    #[test]
    fn test_bounded_by_totals() {
        let a = sig_from(4, 4, |x, _| [x as u8, 0, 0]);
        let b = sig_from(4, 4, |_, y| [y as u8, 1, 0]);
        let c = sig_from(8, 2, |x, _| [(x / 2) as u8, 0, 0]);
        assert!(score(&a, &b).unwrap() <= a.total());
        // Same histogram, different layout
        assert_eq!(score(&a, &c).unwrap(), 16);
    }

    #[test]
    fn test_pixel_count_mismatch() {
        let a = sig_from(2, 2, |_, _| [1, 1, 1]);
        let b = sig_from(3, 3, |_, _| [1, 1, 1]);
        match score(&a, &b) {
            Err(MatchError::DimensionMismatch { left, right }) => {
                assert_eq!(left, 4);
                assert_eq!(right, 9);
            }
            other => panic!("expected mismatch, got {:?}", other),
        }
    }
}
