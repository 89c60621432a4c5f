//! Provides a minimal rust wrapper for parts of the NI-DAQmx C library.
//!
//! ## Overview
//!
//! The core of this module is the [`NiTask`] struct which represents an
//! NI-DAQmx task. It encapsulates a handle to an NI-DAQmx task and provides
//! methods that map to the DAQmx C-functions the camera trigger testbench
//! needs: creating digital output channels, configuring the finite sample
//! clock, preloading a digital line buffer, and the start/stop/wait
//! lifecycle.
//!
//! Additionally, the module provides the utility functions [`daqmx_call`] and
//! [`reset_ni_device`] to simplify error handling and device interactions.
//!
//! **Refer to implementations of the [`NiTask`] struct to see the wrapped
//! methods and invoked
//! [DAQmx C-functions](https://www.ni.com/docs/en-US/bundle/ni-daqmx-c-api-ref/page/cdaqmx/help_file_title.html)**
//!
//! ## Safety and Error Handling
//!
//! Given that this module interfaces with a C library, many of the calls
//! involve unsafe Rust blocks. To mitigate potential issues, this module
//! provides the `daqmx_call` function that wraps DAQmx C-function calls,
//! checks for errors, and handles them appropriately (logging and panicking).
//! ***In addition to printing, NI-DAQmx driver errors are saved in the
//! `nidaqmx_error.logs` file in the directory of the calling shell.
//!
//! ## Cleanup and Resource Management
//!
//! The `NiTask` struct implements the `Drop` trait, ensuring that the DAQmx
//! task handle is cleaned up properly when an instance goes out of scope.
//!
//! ## Example
//!
//! ```ignore
//! # use camexpctrl_backend::nidaqmx::NiTask;
//! let task = NiTask::new();
//! task.create_do_chan("/Dev3/port0/line0");
//! task.cfg_sample_clk("", 1e6, 1000);
//! task.disable_start_trig();
//! // ... write the trigger buffer ...
//! task.start();
//! task.wait_until_done(-1.0);
//! task.stop();
//! ```

use libc;
use ndarray::Array2;
use std::fs::OpenOptions;
use std::io::Write;

type CConstStr = *const libc::c_char;
type CCharBuf = *mut libc::c_char;
type CFloat64 = libc::c_double;
type CUint32 = libc::c_uint;
type CUint64 = libc::c_ulonglong;
type CBool32 = libc::c_uint;
type CInt32 = libc::c_int;
pub type TaskHandle = *mut libc::c_void;

pub const DAQMX_VAL_RISING: CInt32 = 10280;
pub const DAQMX_VAL_FINITESAMPS: CInt32 = 10178;
pub const DAQMX_VAL_GROUPBYCHANNEL: CBool32 = 0;
pub const DAQMX_VAL_WAITINFINITELY: CFloat64 = -1.0;
pub const DAQMX_VAL_CHANPERLINE: CInt32 = 0;

#[link(name = "NIDAQmx")]
extern "C" {
    fn DAQmxResetDevice(name: CConstStr) -> CInt32;
    fn DAQmxGetExtendedErrorInfo(errorString: CCharBuf, bufferSize: CUint32) -> CInt32;

    fn DAQmxCreateTask(taskName: CConstStr, taskHandle_ptr: &mut TaskHandle) -> CInt32;
    fn DAQmxStartTask(handle: TaskHandle) -> CInt32;
    fn DAQmxStopTask(handle: TaskHandle) -> CInt32;
    fn DAQmxClearTask(handle: TaskHandle) -> CInt32;

    fn DAQmxWaitUntilTaskDone(handle: TaskHandle, timeToWait: CFloat64) -> CInt32;
    fn DAQmxCfgSampClkTiming(
        handle: TaskHandle,
        src: CConstStr,
        rate: CFloat64,
        activeEdge: CInt32,
        sampleMode: CInt32,
        sampsPerChan: CUint64,
    ) -> CInt32;

    fn DAQmxCreateDOChan(
        handle: TaskHandle,
        lines: CConstStr,
        name: CConstStr,
        lineGrouping: CInt32,
    ) -> CInt32;

    fn DAQmxWriteDigitalLines(
        handle: TaskHandle,
        seqLen: CInt32,
        autoStart: CBool32,
        timeout: CFloat64,
        dataLayout: CBool32,
        writeArray: *const u8,
        sampsPerChanWritten: *mut CInt32,
        reserved: *mut CBool32,
    ) -> CInt32;

    fn DAQmxDisableStartTrig(handle: TaskHandle) -> CInt32;
    fn DAQmxCfgDigEdgeStartTrig(
        handle: TaskHandle,
        triggerSource: CConstStr,
        triggerEdge: CInt32,
    ) -> CInt32;
    fn DAQmxSetStartTrigRetriggerable(handle: TaskHandle, data: CBool32) -> CInt32;
}

/// Calls a DAQmx C-function and handles potential errors.
///
/// Every DAQmx C-function call returns an `int32` which, if negative,
/// indicates an error. If the call contained in `func` fails, this function
/// retrieves the extended error information with
/// `DAQmxGetExtendedErrorInfo`, appends it to `nidaqmx_error.logs`, and
/// panics with the error message. Raw driver codes are never reinterpreted.
pub fn daqmx_call<F: FnOnce() -> CInt32>(func: F) {
    let err_code = func();
    if err_code < 0 {
        let mut err_buff = [0i8; 2048];
        unsafe {
            DAQmxGetExtendedErrorInfo(err_buff.as_mut_ptr(), 2048 as CUint32);
        }
        let error_string = unsafe { std::ffi::CStr::from_ptr(err_buff.as_ptr()) }
            .to_string_lossy()
            .into_owned();

        // Write the error to log file
        let mut file = OpenOptions::new()
            .write(true)
            .append(true)
            .create(true)
            .open("./nidaqmx_error.logs")
            .expect("Failed to open nidaqmx_error.logs");
        writeln!(file, "DAQmx Error: {}", error_string)
            .expect("Failed to write error to nidaqmx_error.logs");
        panic!("DAQmx Error: {}", error_string);
    }
}

/// Resets a specified National Instruments (NI) device via
/// `DAQmxResetDevice`, bringing it back to a known default state.
pub fn reset_ni_device(name: &str) {
    let name_cstr = std::ffi::CString::new(name).expect("Failed to convert device name to CString");
    daqmx_call(|| unsafe { DAQmxResetDevice(name_cstr.as_ptr()) });
}

/// Represents a National Instruments (NI) DAQmx task.
///
/// `NiTask` encapsulates a handle to an NI-DAQmx task. Creating an instance
/// corresponds to creating a new NI-DAQmx task; methods on the struct invoke
/// the associated DAQmx C-functions on that task.
///
/// Ensure the NI-DAQmx drivers and libraries are installed and accessible
/// when using this struct (build with the `nidaqmx` feature).
pub struct NiTask {
    handle: TaskHandle,
}

// DAQmx task handles are valid from any thread; the driver serializes
// concurrent calls on the same task internally.
unsafe impl Send for NiTask {}
unsafe impl Sync for NiTask {}

impl NiTask {
    pub fn new() -> Self {
        let mut taskhandle: TaskHandle = std::ptr::null_mut();
        let task_name_cstr =
            std::ffi::CString::new("").expect("Failed to convert task name to CString");
        daqmx_call(|| unsafe { DAQmxCreateTask(task_name_cstr.as_ptr(), &mut taskhandle) });
        Self { handle: taskhandle }
    }

    pub fn clear(&self) {
        daqmx_call(|| unsafe { DAQmxClearTask(self.handle) });
    }
    pub fn start(&self) {
        daqmx_call(|| unsafe { DAQmxStartTask(self.handle) });
    }
    pub fn stop(&self) {
        daqmx_call(|| unsafe { DAQmxStopTask(self.handle) });
    }

    /// Blocks until the finite generation completes. A negative `timeout`
    /// waits indefinitely ([`DAQMX_VAL_WAITINFINITELY`]).
    pub fn wait_until_done(&self, timeout: f64) {
        daqmx_call(|| unsafe { DAQmxWaitUntilTaskDone(self.handle, timeout as CFloat64) });
    }

    /// Configures a finite-sample clock on the rising edge.
    pub fn cfg_sample_clk(&self, clk_src: &str, samp_rate: f64, seq_len: u64) {
        let src_cstring =
            std::ffi::CString::new(clk_src).expect("Failed to convert clk_src to CString");
        daqmx_call(|| unsafe {
            DAQmxCfgSampClkTiming(
                self.handle,
                src_cstring.as_ptr(),
                samp_rate as CFloat64,
                DAQMX_VAL_RISING,
                DAQMX_VAL_FINITESAMPS,
                seq_len as CUint64,
            )
        })
    }

    /// Creates one digital output channel per physical line.
    pub fn create_do_chan(&self, name: &str) {
        let name_cstr =
            std::ffi::CString::new(name).expect("Failed to convert physical name to CString");
        let assigned_name_cstr = std::ffi::CString::new("").expect("");
        daqmx_call(|| unsafe {
            DAQmxCreateDOChan(
                self.handle,
                name_cstr.as_ptr(),
                assigned_name_cstr.as_ptr(),
                DAQMX_VAL_CHANPERLINE,
            )
        })
    }

    /// Preloads the digital line buffer without auto-start.
    ///
    /// `signal_arr` is laid out group-by-channel: shape `(num_lines,
    /// samps_per_chan)`, one contiguous row per channel. Returns the samples
    /// written per channel as reported by the driver.
    pub fn write_digital_lines(&self, signal_arr: &Array2<u8>) -> usize {
        let mut nwritten: CInt32 = 0;
        daqmx_call(|| unsafe {
            DAQmxWriteDigitalLines(
                self.handle,
                signal_arr.shape()[1] as CInt32,
                false as CBool32,
                DAQMX_VAL_WAITINFINITELY,
                DAQMX_VAL_GROUPBYCHANNEL,
                signal_arr.as_ptr(),
                &mut nwritten as *mut CInt32,
                std::ptr::null_mut(),
            )
        });
        nwritten as usize
    }

    /// Disables the start trigger so the task starts on the software call.
    pub fn disable_start_trig(&self) {
        daqmx_call(|| unsafe { DAQmxDisableStartTrig(self.handle) });
    }

    pub fn cfg_dig_edge_start_trigger(&self, trigger_source: &str) {
        let trigger_source_cstr = std::ffi::CString::new(trigger_source)
            .expect("Failed to convert trigger_source to CString");
        daqmx_call(|| unsafe {
            DAQmxCfgDigEdgeStartTrig(self.handle, trigger_source_cstr.as_ptr(), DAQMX_VAL_RISING)
        });
    }

    pub fn set_start_trig_retriggerable(&self, val: bool) {
        daqmx_call(|| unsafe { DAQmxSetStartTrigRetriggerable(self.handle, val as CBool32) });
    }
}

// Define deletion behavior
impl Drop for NiTask {
    fn drop(&mut self) {
        self.clear()
    }
}
