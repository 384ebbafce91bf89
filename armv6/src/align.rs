/// Something (usually addresses or sizes) that can be aligned to a power of
/// two represented in the same type.
pub trait Alignable {
    type Alignment;

    /// Return the smallest multiple of `alignment` that is `>= self`.
    fn align_up(self, alignment: Self::Alignment) -> Self;

    /// Return the largest multiple of `alignment` that is `<= self`.
    fn align_down(self, alignment: Self::Alignment) -> Self;
}

macro_rules! impl_alignable {
    ($int:ty) => {
        impl Alignable for $int {
            type Alignment = $int;

            fn align_up(self, alignment: $int) -> $int {
                assert!(alignment.is_power_of_two(), "alignment must be a power of two");
                let mask = alignment - 1;
                (self + mask) & !mask
            }

            fn align_down(self, alignment: $int) -> $int {
                assert!(alignment.is_power_of_two(), "alignment must be a power of two");
                self & !(alignment - 1)
            }
        }
    };
}

impl_alignable!(usize);
impl_alignable!(u32);

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn align_down_test() {
        assert_eq!(23_usize.align_down(8), 16);
        assert_eq!(24_usize.align_down(8), 24);
        assert_eq!(25_usize.align_down(8), 24);
        assert_eq!(0_usize.align_down(4096), 0);
        assert_eq!(4097_u32.align_down(4096), 4096);
    }

    #[test]
    fn align_up_test() {
        assert_eq!(23_usize.align_up(8), 24);
        assert_eq!(24_usize.align_up(8), 24);
        assert_eq!(25_usize.align_up(8), 32);
        assert_eq!(0_usize.align_up(4096), 0);
        assert_eq!(1_u32.align_up(4096), 4096);
    }

    #[test]
    #[should_panic]
    fn alignment_must_be_power_of_two() {
        let _ = 17_usize.align_up(3);
    }
}
