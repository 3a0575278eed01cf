use crate::settings::{FRAMES_IN_FLIGHT, FrameLabel};

pub struct FrameCounter {
    /// 当前的帧序号，一直累加
    frame_id: u64,
}
// new & init
impl FrameCounter {
    pub fn new() -> Self {
        Self { frame_id: 0 }
    }
}
impl Default for FrameCounter {
    fn default() -> Self {
        Self::new()
    }
}
// update
impl FrameCounter {
    #[inline]
    pub fn next_frame(&mut self) {
        self.frame_id = self.frame_id.wrapping_add(1);
    }
}
// getters
impl FrameCounter {
    #[inline]
    pub fn frame_id(&self) -> u64 {
        self.frame_id
    }
    #[inline]
    pub fn frame_label(&self) -> FrameLabel {
        FrameLabel::from_usize(self.frame_id as usize % FRAMES_IN_FLIGHT)
    }
    #[inline]
    pub fn frame_name(&self) -> String {
        format!("[F{}{}]", self.frame_id, self.frame_label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_label_alternates() {
        let mut counter = FrameCounter::new();
        assert_eq!(counter.frame_label(), FrameLabel::A);
        counter.next_frame();
        assert_eq!(counter.frame_label(), FrameLabel::B);
        counter.next_frame();
        assert_eq!(counter.frame_label(), FrameLabel::A);
        assert_eq!(counter.frame_id(), 2);
    }

    #[test]
    fn test_frame_id_wraps_without_panic() {
        let mut counter = FrameCounter::new();
        counter.frame_id = u64::MAX;
        counter.next_frame();
        assert_eq!(counter.frame_id(), 0);
        assert_eq!(counter.frame_label(), FrameLabel::A);
    }

    #[test]
    fn test_frame_name_contains_label() {
        let counter = FrameCounter::new();
        assert_eq!(counter.frame_name(), "[F0A]");
    }
}
