mod common;

use std::sync::atomic::Ordering;

use ash::vk;
use common::*;
use vulkan_recorder::*;

#[test]
fn begin_and_end_move_through_the_states() {
    let (log, device) = mock_device();
    let pool = CommandPool::new(&device, 3, ResetMode::ResetPool).unwrap();
    let mut cmd = pool.allocate(vk::CommandBufferLevel::PRIMARY).unwrap();
    assert_eq!(cmd.state(), State::Initial);
    assert_eq!(pool.queue_family_index(), 3);

    cmd.begin(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT, None).unwrap();
    assert_eq!(cmd.state(), State::Recording);
    assert!(cmd.is_recording());

    cmd.end().unwrap();
    assert_eq!(cmd.state(), State::Executable);

    // Executable buffers can be begun again
    cmd.begin(vk::CommandBufferUsageFlags::empty(), None).unwrap();
    assert!(cmd.is_recording());

    let events = log.events();
    assert!(matches!(events[0], Event::CreatePool(flags) if flags.is_empty()));
    assert!(matches!(events[1], Event::Allocate(_, vk::CommandBufferLevel::PRIMARY)));
    assert!(matches!(events[2], Event::Begin(buffer, None) if buffer == cmd.raw()));
    assert!(matches!(events[3], Event::End(buffer) if buffer == cmd.raw()));
}

#[test]
fn begin_resets_every_state_container() {
    let (_log, device) = mock_device();
    let pool = CommandPool::new(&device, 0, ResetMode::ResetPool).unwrap();
    let mut cmd = pool.allocate(vk::CommandBufferLevel::PRIMARY).unwrap();
    let set = set_layout(10, &[(0, vk::DescriptorType::UNIFORM_BUFFER)]);

    cmd.begin(vk::CommandBufferUsageFlags::empty(), None).unwrap();
    cmd.bind_pipeline_layout(graphics_layout(1, &[(0, &set)], Vec::new()));
    cmd.set_rasterization_state(RasterizationState {
        cull_mode: vk::CullModeFlags::NONE,
        ..Default::default()
    });
    cmd.bind_buffer(&buffer(7), 0, 64, 0, 0, 0);
    cmd.draw(3, 1, 0, 0).unwrap();
    cmd.end().unwrap();

    cmd.begin(vk::CommandBufferUsageFlags::empty(), None).unwrap();
    assert!(cmd.pipeline_state().pipeline_layout().is_none());
    assert!(!cmd.pipeline_state().is_dirty());
    assert_eq!(cmd.pipeline_state().rasterization_state().cull_mode, vk::CullModeFlags::BACK);
    assert!(cmd.resource_binding_state().set_bindings().is_empty());
    assert!(cmd.descriptor_set_layout_state().is_empty());
}

#[test]
fn individual_reset_reaches_the_driver() {
    let (log, device) = mock_device();
    let pool = CommandPool::new(&device, 0, ResetMode::ResetIndividually).unwrap();
    let mut cmd = pool.allocate(vk::CommandBufferLevel::PRIMARY).unwrap();

    cmd.begin(vk::CommandBufferUsageFlags::empty(), None).unwrap();
    cmd.end().unwrap();
    cmd.reset(ResetMode::ResetIndividually).unwrap();

    assert_eq!(cmd.state(), State::Initial);
    let events = log.events();
    assert!(matches!(events[0], Event::CreatePool(flags) if flags == vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER));
    assert!(events.iter().any(|event| matches!(event, Event::Reset(buffer) if *buffer == cmd.raw())));
}

#[test]
fn failed_reset_invalidates_the_buffer() {
    let (log, device) = mock_device();
    let pool = CommandPool::new(&device, 0, ResetMode::ResetIndividually).unwrap();
    let mut cmd = pool.allocate(vk::CommandBufferLevel::PRIMARY).unwrap();

    cmd.begin(vk::CommandBufferUsageFlags::empty(), None).unwrap();
    cmd.end().unwrap();

    log.fail_resets.store(true, Ordering::Relaxed);
    let result = cmd.reset(ResetMode::ResetIndividually);
    assert!(matches!(result, Err(Error::Vulkan { result: vk::Result::ERROR_OUT_OF_DEVICE_MEMORY, .. })));
    assert_eq!(cmd.state(), State::Invalid);

    log.fail_resets.store(false, Ordering::Relaxed);
    cmd.reset(ResetMode::ResetIndividually).unwrap();
    assert_eq!(cmd.state(), State::Initial);
}

#[test]
fn pool_reset_leaves_buffers_alone() {
    let (log, device) = mock_device();
    let pool = CommandPool::new(&device, 0, ResetMode::ResetPool).unwrap();
    let mut cmd = pool.allocate(vk::CommandBufferLevel::PRIMARY).unwrap();

    cmd.begin(vk::CommandBufferUsageFlags::empty(), None).unwrap();
    cmd.end().unwrap();
    pool.reset().unwrap();
    cmd.reset(ResetMode::ResetPool).unwrap();

    assert_eq!(cmd.state(), State::Initial);
    let events = log.events();
    assert!(events.iter().any(|event| matches!(event, Event::ResetPool)));
    assert!(!events.iter().any(|event| matches!(event, Event::Reset(_))));
}

#[test]
fn dropping_hands_handles_back() {
    let (log, device) = mock_device();
    let raw = {
        let pool = CommandPool::new(&device, 0, ResetMode::ResetPool).unwrap();
        let cmd = pool.allocate(vk::CommandBufferLevel::PRIMARY).unwrap();
        cmd.raw()
    };

    let events = log.events();
    let freed = events.iter().position(|event| matches!(event, Event::Free(buffer) if *buffer == raw)).unwrap();
    let destroyed = events.iter().position(|event| matches!(event, Event::DestroyPool)).unwrap();
    assert!(freed < destroyed);
}

#[test]
fn secondary_inherits_the_render_pass_of_its_primary() {
    let (log, device) = mock_device();
    let pool = CommandPool::new(&device, 0, ResetMode::ResetPool).unwrap();
    let mut primary = pool.allocate(vk::CommandBufferLevel::PRIMARY).unwrap();
    let mut secondary = pool.allocate(vk::CommandBufferLevel::SECONDARY).unwrap();
    let subpasses = [
        SubpassInfo { input_attachments: vec![], output_attachments: vec![0, 2] },
        SubpassInfo { input_attachments: vec![0], output_attachments: vec![1] },
    ];

    primary.begin(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT, None).unwrap();
    primary
        .begin_render_pass(&render_target(), &[], &[], vk::SubpassContents::SECONDARY_COMMAND_BUFFERS, &subpasses)
        .unwrap();
    primary.next_subpass().unwrap();

    secondary
        .begin(vk::CommandBufferUsageFlags::RENDER_PASS_CONTINUE, Some(&primary))
        .unwrap();
    secondary.end().unwrap();
    primary.execute_commands(&[&secondary]);

    let binding = primary.current_render_pass();
    let render_pass = binding.render_pass.as_ref().unwrap().raw();
    let framebuffer = binding.framebuffer.as_ref().unwrap().raw();
    let inheritance = log
        .events()
        .into_iter()
        .find_map(|event| match event {
            Event::Begin(buffer, inheritance) if buffer == secondary.raw() => inheritance,
            _ => None,
        })
        .unwrap();

    assert_eq!(inheritance.render_pass, render_pass);
    assert_eq!(inheritance.framebuffer, framebuffer);
    assert_eq!(inheritance.subpass, 1);
    assert_eq!(secondary.pipeline_state().subpass_index(), 1);

    let last = log.commands_of(primary.raw()).pop().unwrap();
    assert!(matches!(last, Command::RenderPass(RenderPassCommand::ExecuteCommands { ref buffers }) if buffers == &vec![secondary.raw()]));
}

#[test]
fn secondary_begun_after_the_pass_ended_inherits_nothing() {
    let (log, device) = mock_device();
    let pool = CommandPool::new(&device, 0, ResetMode::ResetPool).unwrap();
    let mut primary = pool.allocate(vk::CommandBufferLevel::PRIMARY).unwrap();
    let mut secondary = pool.allocate(vk::CommandBufferLevel::SECONDARY).unwrap();

    primary.begin(vk::CommandBufferUsageFlags::empty(), None).unwrap();
    primary
        .begin_render_pass(&render_target(), &[], &[], vk::SubpassContents::INLINE, &[] as &[SubpassInfo])
        .unwrap();
    primary.end_render_pass();
    secondary.begin(vk::CommandBufferUsageFlags::empty(), Some(&primary)).unwrap();

    let inheritance = log
        .events()
        .into_iter()
        .find_map(|event| match event {
            Event::Begin(buffer, inheritance) if buffer == secondary.raw() => inheritance,
            _ => None,
        })
        .unwrap();
    assert_eq!(inheritance.render_pass, vk::RenderPass::null());
    assert_eq!(inheritance.framebuffer, vk::Framebuffer::null());
    assert!(secondary.current_render_pass().render_pass.is_none());
}

#[test]
#[cfg_attr(debug_assertions, should_panic(expected = "already recording"))]
fn beginning_twice_is_rejected() {
    let (_log, device) = mock_device();
    let pool = CommandPool::new(&device, 0, ResetMode::ResetPool).unwrap();
    let mut cmd = pool.allocate(vk::CommandBufferLevel::PRIMARY).unwrap();

    cmd.begin(vk::CommandBufferUsageFlags::empty(), None).unwrap();
    let result = cmd.begin(vk::CommandBufferUsageFlags::empty(), None);

    assert!(matches!(result, Err(Error::InvalidState(_))));
    assert!(cmd.is_recording());
}

#[test]
#[cfg_attr(debug_assertions, should_panic(expected = "not recording"))]
fn ending_without_begin_is_rejected() {
    let (_log, device) = mock_device();
    let pool = CommandPool::new(&device, 0, ResetMode::ResetPool).unwrap();
    let mut cmd = pool.allocate(vk::CommandBufferLevel::PRIMARY).unwrap();

    let result = cmd.end();

    assert!(matches!(result, Err(Error::InvalidState(_))));
    assert_eq!(cmd.state(), State::Initial);
}

#[test]
#[cfg_attr(debug_assertions, should_panic(expected = "must match the one used by the pool"))]
fn reset_mode_must_match_the_pool() {
    let (log, device) = mock_device();
    let pool = CommandPool::new(&device, 0, ResetMode::ResetPool).unwrap();
    let mut cmd = pool.allocate(vk::CommandBufferLevel::PRIMARY).unwrap();

    let result = cmd.reset(ResetMode::ResetIndividually);

    assert!(matches!(result, Err(Error::InvalidArgument(_))));
    assert!(!log.events().iter().any(|event| matches!(event, Event::Reset(_))));
}

#[test]
#[cfg_attr(debug_assertions, should_panic(expected = "primary command buffer must be provided"))]
fn secondary_without_primary_is_rejected() {
    let (_log, device) = mock_device();
    let pool = CommandPool::new(&device, 0, ResetMode::ResetPool).unwrap();
    let mut secondary = pool.allocate(vk::CommandBufferLevel::SECONDARY).unwrap();

    let result = secondary.begin(vk::CommandBufferUsageFlags::RENDER_PASS_CONTINUE, None);

    assert!(matches!(result, Err(Error::InvalidArgument(_))));
    assert!(!secondary.is_recording());
}
