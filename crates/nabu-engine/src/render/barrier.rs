//! Resource-state transitions recorded into a command list.

use crate::hal::{Api, CommandList as _, ResourceState};

/// Records a single transition barrier for all subresources of `resource`.
pub fn transition<A: Api>(
    list: &mut A::CommandList,
    resource: &A::Resource,
    before: ResourceState,
    after: ResourceState,
) {
    list.transition_barrier(resource, before, after);
}

/// Back buffer handed back by the swap chain, about to be drawn to.
pub fn present_to_render_target<A: Api>(list: &mut A::CommandList, back_buffer: &A::Resource) {
    transition::<A>(list, back_buffer, ResourceState::Present, ResourceState::RenderTarget);
}

/// Back buffer finished for this frame, about to be presented.
pub fn render_target_to_present<A: Api>(list: &mut A::CommandList, back_buffer: &A::Resource) {
    transition::<A>(list, back_buffer, ResourceState::RenderTarget, ResourceState::Present);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::headless::Headless;
    use crate::device::{Queue, SwapChain, execute_immediate};
    use crate::hal::QueueKind;
    use crate::testing::{self, NoWindow};

    #[test]
    fn round_trip_leaves_back_buffer_presentable() {
        let device = testing::device();
        let mut queue = Queue::new(&device, QueueKind::Direct).unwrap();
        let chain = SwapChain::new(&device, &queue, &NoWindow, 64, 64, &testing::settings()).unwrap();
        let back_buffer = chain.current_back_buffer_resource();

        execute_immediate(&device, &mut queue, |list| {
            present_to_render_target::<Headless>(list, back_buffer);
            Ok(())
        })
        .unwrap();
        assert_eq!(back_buffer.state(), ResourceState::RenderTarget);

        execute_immediate(&device, &mut queue, |list| {
            render_target_to_present::<Headless>(list, back_buffer);
            Ok(())
        })
        .unwrap();
        assert_eq!(back_buffer.state(), ResourceState::Present);

        let stats = device.raw().stats();
        assert_eq!(stats.barriers, 2);
        assert_eq!(stats.validation_errors, 0);
    }

    #[test]
    fn mismatched_before_state_is_reported() {
        let device = testing::device();
        let mut queue = Queue::new(&device, QueueKind::Direct).unwrap();
        let chain = SwapChain::new(&device, &queue, &NoWindow, 64, 64, &testing::settings()).unwrap();
        let back_buffer = chain.current_back_buffer_resource();

        execute_immediate(&device, &mut queue, |list| {
            render_target_to_present::<Headless>(list, back_buffer);
            Ok(())
        })
        .unwrap();
        assert_eq!(device.raw().stats().validation_errors, 1);
    }
}
