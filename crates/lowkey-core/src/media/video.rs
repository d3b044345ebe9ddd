//! First-frame handling for video carriers, delegated to an external
//! `ffmpeg` binary on the PATH.
//!
//! The contract with ffmpeg is narrow: pull frame 0 out losslessly, and
//! splice a patched frame 0 back in front of the remaining frames with a
//! lossless codec so the embedded bits survive the container.

use std::path::Path;
use std::process::Command;

use log::debug;

use crate::error::LowkeyError;
use crate::result::Result;

pub const TOOL: &str = "ffmpeg";

const SPLICE_FILTER: &str = "[0:v]trim=start_frame=1,setpts=PTS-STARTPTS,format=gbrp[rest];\
     [1:v]format=gbrp[first];\
     [first][rest]concat=n=2:v=1:a=0[v]";

/// Writes the first frame of `video` to `frame_out`, format chosen by the
/// output extension (callers pass a PNG path).
pub fn extract_first_frame(video: &Path, frame_out: &Path) -> Result<()> {
    let mut cmd = Command::new(TOOL);
    cmd.args(["-hide_banner", "-loglevel", "error", "-y"])
        .arg("-i")
        .arg(video)
        .args(["-frames:v", "1"])
        .arg(frame_out);
    run(cmd)
}

/// Replaces frame 0 of `video` with `frame` and writes the result to
/// `target`, re-encoding the video stream with FFV1 and copying any audio.
pub fn splice_first_frame(video: &Path, frame: &Path, target: &Path) -> Result<()> {
    let mut cmd = Command::new(TOOL);
    cmd.args(["-hide_banner", "-loglevel", "error", "-y"])
        .arg("-i")
        .arg(video)
        .arg("-i")
        .arg(frame)
        .args(["-filter_complex", SPLICE_FILTER])
        .args(["-map", "[v]", "-map", "0:a?"])
        .args(["-c:v", "ffv1", "-c:a", "copy"])
        .arg(target);
    run(cmd)
}

fn run(mut cmd: Command) -> Result<()> {
    debug!("running {cmd:?}");
    let output = cmd.output().map_err(|e| LowkeyError::ExternalToolFailure {
        tool: TOOL,
        detail: e.to_string(),
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!("{TOOL} stderr: {stderr}");
        let detail = stderr
            .lines()
            .last()
            .unwrap_or("exited with a failure status")
            .to_string();
        return Err(LowkeyError::ExternalToolFailure { tool: TOOL, detail });
    }

    Ok(())
}
