//! Directory lookup port (interface).

/// Port for resolving a process's working directory.
///
/// Called at most once per surviving process per parse. `None` means the
/// directory could not be obtained and renders as an empty string.
pub trait DirectoryLookup: Send + Sync {
    fn directory(&self, pid: u32) -> Option<String>;
}

impl<F> DirectoryLookup for F
where
    F: Fn(u32) -> Option<String> + Send + Sync,
{
    fn directory(&self, pid: u32) -> Option<String> {
        self(pid)
    }
}
