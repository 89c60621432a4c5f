//! FFI binding to the vendor camera acquisition DLL.
//!
//! The DLL hosts the acquisition worker thread, the internal frame queue and
//! the grabber state machine; these exports are thin accessors around it.
//! [`CameraDll`] marshals them into the [`FrameAcquisitionService`] contract
//! so the rest of the crate stays independent of the binding mechanism.
//!
//! Build with the `camera_dll` feature and make sure the interface DLL (and
//! the libraries it loads in turn) are resolvable at link/run time.
//!
//! Note on sentinels: the `size_t` setters accept the `usize::MAX` rendition
//! of `-1` unchanged, which is exactly the "not grabbing" convention the DLL
//! uses internally.

use libc;

use crate::camera::FrameAcquisitionService;

type CInt = libc::c_int;
type CSizeT = libc::size_t;
type CBool = bool;

#[link(name = "dll_interface")]
extern "C" {
    fn start_interface() -> CInt;
    fn stop_interface() -> CInt;
    fn join_interface() -> CInt;

    fn set_external_trigger_enable(val: CBool) -> CInt;

    fn set_frames_grabbed(val: CSizeT) -> CInt;
    fn get_frames_grabbed() -> CSizeT;
    fn set_frames_to_grab(val: CSizeT) -> CInt;
    fn get_frames_to_grab() -> CSizeT;

    fn get_number_of_frames() -> CSizeT;
    fn get_frame_size_in_bytes() -> CSizeT;
    fn get_image_width() -> CSizeT;
    fn get_image_height() -> CSizeT;

    fn read_oldest_frame(user_buffer: *mut u8) -> CInt;
    fn clear_frame_list() -> CInt;

    fn print_info_on_frames() -> CSizeT;
}

/// Handle to the acquisition worker living inside the vendor DLL.
///
/// The DLL state is process-global, so treat this as a singleton: construct
/// one, `start` once, and serialize lifecycle calls from a single thread.
pub struct CameraDll;

impl CameraDll {
    pub fn new() -> Self {
        Self
    }

    /// Debug helper: has the DLL print its view of the queued frames.
    pub fn print_info_on_frames(&self) -> usize {
        unsafe { print_info_on_frames() as usize }
    }
}

impl FrameAcquisitionService for CameraDll {
    fn start(&self) -> i32 {
        unsafe { start_interface() }
    }
    fn stop(&self) -> i32 {
        unsafe { stop_interface() }
    }
    fn join(&self) -> i32 {
        unsafe { join_interface() }
    }

    fn set_external_trigger_enable(&self, val: bool) -> i32 {
        unsafe { set_external_trigger_enable(val) }
    }

    fn set_frames_grabbed(&self, val: usize) -> i32 {
        unsafe { set_frames_grabbed(val as CSizeT) }
    }
    fn get_frames_grabbed(&self) -> usize {
        unsafe { get_frames_grabbed() as usize }
    }
    fn set_frames_to_grab(&self, val: usize) -> i32 {
        unsafe { set_frames_to_grab(val as CSizeT) }
    }
    fn get_frames_to_grab(&self) -> usize {
        unsafe { get_frames_to_grab() as usize }
    }

    fn get_number_of_frames(&self) -> usize {
        unsafe { get_number_of_frames() as usize }
    }
    fn get_frame_size_in_bytes(&self) -> usize {
        unsafe { get_frame_size_in_bytes() as usize }
    }
    fn get_image_width(&self) -> usize {
        unsafe { get_image_width() as usize }
    }
    fn get_image_height(&self) -> usize {
        unsafe { get_image_height() as usize }
    }

    fn try_read_oldest_frame(&self, buf: &mut [u8]) -> i32 {
        unsafe { read_oldest_frame(buf.as_mut_ptr()) }
    }
    fn clear_frame_list(&self) -> i32 {
        unsafe { clear_frame_list() }
    }
}
