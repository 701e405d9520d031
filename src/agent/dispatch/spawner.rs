//! Process spawning seam.
//!
//! The executor never calls `Command::spawn` directly; it goes through a
//! [`Spawner`] so tests can observe or refuse launches.

use std::io;
use std::process::{Child, Command};

/// Launches a prepared command.
pub trait Spawner {
    fn spawn(&self, command: &mut Command) -> io::Result<Child>;
}

/// Spawns real OS processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemSpawner;

impl Spawner for SystemSpawner {
    fn spawn(&self, command: &mut Command) -> io::Result<Child> {
        command.spawn()
    }
}

impl<S: Spawner + ?Sized> Spawner for &S {
    fn spawn(&self, command: &mut Command) -> io::Result<Child> {
        (**self).spawn(command)
    }
}

/// Put the child in its own process group so the whole tree can be killed.
#[cfg(unix)]
pub(crate) fn isolate_process_group(command: &mut Command) {
    use std::os::unix::process::CommandExt;
    command.process_group(0);
}

#[cfg(not(unix))]
pub(crate) fn isolate_process_group(_command: &mut Command) {}

/// Kill a child and everything in its process group, then reap it.
pub(crate) fn kill_process_tree(child: &mut Child) {
    #[cfg(unix)]
    {
        // Negative pid targets the group created by `isolate_process_group`.
        let pgid = child.id() as libc::pid_t;
        unsafe {
            libc::kill(-pgid, libc::SIGKILL);
        }
    }

    // On Unix the group kill already covers this; elsewhere it is the only kill.
    let _ = child.kill();
    let _ = child.wait();
}
