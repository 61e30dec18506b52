/// Append-only list of output chunks.
///
/// Consecutive [`OutputBuffer::buffer`] writes are merged into one chunk so
/// that the most recent unstructured text is always a single contiguous
/// string. [`OutputBuffer::push`] writes always start a new chunk and end the
/// current merge run. Either way the output is the concatenation of all
/// writes in order.
#[derive(Debug, Default)]
pub(crate) struct OutputBuffer {
    chunks: Vec<String>,
    /// The last chunk was produced by `buffer` and may be extended.
    merge_open: bool,
}

impl OutputBuffer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Write unstructured text, merging into the previous chunk if it was
    /// also written with `buffer`.
    pub(crate) fn buffer(&mut self, text: &str) {
        match self.chunks.last_mut() {
            Some(last) if self.merge_open => last.push_str(text),
            Some(_) | None => {
                self.chunks.push(text.to_string());
                self.merge_open = true;
            }
        }
    }

    /// Write structural text as its own chunk.
    pub(crate) fn push<T: Into<String>>(&mut self, text: T) {
        self.chunks.push(text.into());
        self.merge_open = false;
    }

    #[cfg(test)]
    pub(crate) fn chunks(&self) -> &[String] {
        &self.chunks
    }

    pub(crate) fn len(&self) -> usize {
        self.chunks.iter().map(String::len).sum()
    }

    pub(crate) fn finish(self) -> String {
        self.chunks.concat()
    }
}
