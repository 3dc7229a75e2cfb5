/// One bit per 1 KiB page group, both 64 KiB banks.
///
/// A group is erased before the first page goes into it and never again in
/// the same power cycle, so consecutive pages of an image only pay for one
/// erase per group.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EraseMap(u128);

impl EraseMap {
    pub const fn new() -> Self {
        Self(0)
    }

    #[inline]
    pub fn needs_erase(&self, group: u8) -> bool {
        self.0 & Self::bit(group) == 0
    }

    #[inline]
    pub fn mark(&mut self, group: u8) {
        self.0 |= Self::bit(group);
    }

    pub fn bits(&self) -> u128 {
        self.0
    }

    const fn bit(group: u8) -> u128 {
        1 << (group & 127)
    }
}
