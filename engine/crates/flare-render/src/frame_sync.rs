use std::rc::Rc;

use flare_gfx::GfxResult;
use flare_gfx::commands::fence::GfxFence;
use flare_gfx::commands::semaphore::GfxSemaphore;
use flare_gfx::foundation::device::GfxDevice;

use crate::settings::{FRAMES_IN_FLIGHT, FrameLabel};

/// 单个 in-flight slot 的同步对象
///
/// fence 创建为 signaled 状态，保证第一次使用 slot 时 wait 立即返回。
pub struct FrameSlot {
    /// acquire 完成后由 presentation engine signal
    pub image_available: GfxSemaphore,
    /// submit 的全部工作完成后 signal，present 在它之后
    pub render_finished: GfxSemaphore,
    /// 标记本 slot 上一次 submit 的工作是否完成
    pub in_flight: GfxFence,
}

// new & init
impl FrameSlot {
    fn new(device: Rc<GfxDevice>) -> GfxResult<Self> {
        Ok(Self {
            image_available: GfxSemaphore::new(device.clone())?,
            render_finished: GfxSemaphore::new(device.clone())?,
            in_flight: GfxFence::new(device, true)?,
        })
    }
}

/// 每个 in-flight 帧一组同步对象
pub struct FrameSync {
    slots: Vec<FrameSlot>,
}

// new & init
impl FrameSync {
    pub fn new(device: &Rc<GfxDevice>) -> GfxResult<Self> {
        let slots = (0..FRAMES_IN_FLIGHT)
            .map(|_| FrameSlot::new(device.clone()))
            .collect::<GfxResult<Vec<_>>>()?;
        Ok(Self { slots })
    }
}

// getters
impl FrameSync {
    #[inline]
    pub fn slot(&self, frame_label: FrameLabel) -> &FrameSlot {
        &self.slots[*frame_label]
    }
}

#[cfg(test)]
mod tests {
    use crate::frame_counter::FrameCounter;
    use crate::settings::FRAMES_IN_FLIGHT;

    /// fence 协议的 CPU 侧模型：wait 是唯一的 backpressure，
    /// 任意时刻未完成的 submit 不会超过 slot 数量。
    #[test]
    fn test_at_most_frames_in_flight_outstanding() {
        // true 表示该 slot 的 GPU 工作已完成（fence signaled）
        let mut fence_signaled = [true; FRAMES_IN_FLIGHT];
        let mut outstanding = 0usize;
        let mut counter = FrameCounter::new();

        for _ in 0..100 {
            let slot = *counter.frame_label();

            // wait：若 slot 仍被占用，CPU 阻塞到 GPU 完成
            if !fence_signaled[slot] {
                fence_signaled[slot] = true;
                outstanding -= 1;
            }
            // reset + submit
            fence_signaled[slot] = false;
            outstanding += 1;

            assert!(outstanding <= FRAMES_IN_FLIGHT);
            counter.next_frame();
        }
    }

    #[test]
    fn test_slots_are_reused_in_order() {
        let mut counter = FrameCounter::new();
        let first_round: Vec<usize> = (0..FRAMES_IN_FLIGHT)
            .map(|_| {
                let slot = *counter.frame_label();
                counter.next_frame();
                slot
            })
            .collect();
        let second_round: Vec<usize> = (0..FRAMES_IN_FLIGHT)
            .map(|_| {
                let slot = *counter.frame_label();
                counter.next_frame();
                slot
            })
            .collect();
        assert_eq!(first_round, second_round);
    }
}
