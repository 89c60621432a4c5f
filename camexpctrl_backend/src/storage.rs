//! HDF5 persistence for captured frame stacks.
//!
//! Frames from one acquisition run are stacked along axis 0 and written as a
//! flat `data` dataset under the fixed `pt_camera` group. The file is opened
//! in append mode so successive bench runs can add to the same container.
//! An empty frame list creates the group but no dataset.
//!
//! Enable with the `storage_hdf5` feature (needs a native HDF5
//! installation).

use hdf5::File;
use ndarray::{Array2, Array3, Axis};
use std::path::Path;

/// Fixed group path for the camera frame stack.
pub const FRAME_GROUP: &str = "pt_camera";

/// Writes `frames` as `/pt_camera/data`, shape `(num_frames, height, width)`.
///
/// All frames must share the geometry of the first one; a mismatch panics,
/// since mixed geometries within one run indicate a bench setup error.
pub fn save_frames_hdf5(path: &Path, frames: &[Array2<u8>]) -> hdf5::Result<()> {
    let file = File::append(path)?;
    let group = match file.group(FRAME_GROUP) {
        Ok(group) => group,
        Err(_) => file.create_group(FRAME_GROUP)?,
    };

    // Only save if we acquired at least 1 frame
    if frames.is_empty() {
        log::debug!("no frames captured, skipping dataset creation");
        return Ok(());
    }

    let (height, width) = frames[0].dim();
    let mut stacked = Array3::<u8>::zeros((frames.len(), height, width));
    for (i, frame) in frames.iter().enumerate() {
        assert!(
            frame.dim() == (height, width),
            "Frame {} geometry {:?} differs from first frame {:?}",
            i,
            frame.dim(),
            (height, width)
        );
        stacked.index_axis_mut(Axis(0), i).assign(frame);
    }

    group.new_dataset_builder().with_data(&stacked).create("data")?;
    log::debug!(
        "saved {} frames of {}x{} to {:?}",
        frames.len(),
        height,
        width,
        path
    );
    Ok(())
}
