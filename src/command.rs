//! Batched display commands.
//!
//! One frame is sent to the display backend as a single flat `u32` buffer:
//!
//! ```text
//! word 0          number of valid slots (count)
//! words 1..5      slot 0: [opcode, handle, reserved, reserved]
//! words 5..9      slot 1: ...
//! ```
//!
//! Opcode 1 uploads the surface named by the handle; opcode 2 draws it.
//! Handles index into [`Surfaces`] rather than carrying raw addresses.
//!
//! Appending past capacity is a silent no-op: the command is dropped, the
//! buffer is unchanged, and nothing is logged.

use crate::pixel::PixelBuffer;

/// Words per command slot.
pub const SLOT_WORDS: usize = 4;

/// Slots needed for one frame: upload then draw.
pub const DEFAULT_COMMAND_CAPACITY: usize = 2;

/// Command opcodes as they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Opcode {
    UploadTexture = 1,
    DrawArrays = 2,
}

impl TryFrom<u32> for Opcode {
    type Error = CommandDecodeError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Opcode::UploadTexture),
            2 => Ok(Opcode::DrawArrays),
            other => Err(CommandDecodeError::UnknownOpcode(other)),
        }
    }
}

/// Opaque reference to a pixel surface owned by [`Surfaces`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceHandle(pub u32);

/// A decoded command slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    UploadTexture(SurfaceHandle),
    DrawArrays,
}

/// Errors reading a command buffer on the backend side.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandDecodeError {
    #[error("command buffer is empty")]
    Empty,

    #[error("command buffer declares {count} slots but only holds {available}")]
    Truncated { count: usize, available: usize },

    #[error("unknown opcode {0}")]
    UnknownOpcode(u32),
}

/// Fixed-capacity command buffer, reused every frame.
#[derive(Debug, Clone)]
pub struct CommandBuffer {
    words: Vec<u32>,
    count: usize,
    capacity: usize,
}

impl CommandBuffer {
    /// Allocate `capacity * 4 + 1` words. Never reallocated afterwards.
    pub fn new(capacity: usize) -> Self {
        Self {
            words: vec![0; capacity * SLOT_WORDS + 1],
            count: 0,
            capacity,
        }
    }

    /// Start a new frame. Slot contents are left in place and overwritten on append.
    pub fn reset(&mut self) {
        self.count = 0;
    }

    /// Append an upload of `surface`. Returns false if the buffer was full.
    pub fn add_upload_command(&mut self, surface: SurfaceHandle) -> bool {
        self.push(Opcode::UploadTexture, surface.0)
    }

    /// Append a draw. Returns false if the buffer was full.
    pub fn add_draw_command(&mut self) -> bool {
        self.push(Opcode::DrawArrays, 0)
    }

    fn push(&mut self, opcode: Opcode, param: u32) -> bool {
        if self.count == self.capacity {
            return false;
        }
        let base = 1 + self.count * SLOT_WORDS;
        self.words[base] = opcode as u32;
        self.words[base + 1] = param;
        self.words[base + 2] = 0;
        self.words[base + 3] = 0;
        self.count += 1;
        true
    }

    /// Write the slot count into word 0 and expose the wire buffer.
    pub fn finalize(&mut self) -> &[u32] {
        self.words[0] = self.count as u32;
        &self.words
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Raw words, including stale slots past `count`.
    pub fn words(&self) -> &[u32] {
        &self.words
    }
}

/// Decode a finalized buffer into commands, in slot order up to `count`.
pub fn decode_commands(words: &[u32]) -> Result<Vec<Command>, CommandDecodeError> {
    let (&count, slots) = words.split_first().ok_or(CommandDecodeError::Empty)?;
    let count = count as usize;
    let available = slots.len() / SLOT_WORDS;
    if count > available {
        return Err(CommandDecodeError::Truncated { count, available });
    }

    slots
        .chunks_exact(SLOT_WORDS)
        .take(count)
        .map(|slot| match Opcode::try_from(slot[0])? {
            Opcode::UploadTexture => Ok(Command::UploadTexture(SurfaceHandle(slot[1]))),
            Opcode::DrawArrays => Ok(Command::DrawArrays),
        })
        .collect()
}

/// Pixel surfaces a backend may be asked to upload.
#[derive(Debug)]
pub struct Surfaces {
    buffers: Vec<PixelBuffer>,
}

impl Surfaces {
    pub fn new() -> Self {
        Self {
            buffers: Vec::new(),
        }
    }

    /// Take ownership of `buffer` and hand back its handle.
    pub fn register(&mut self, buffer: PixelBuffer) -> SurfaceHandle {
        self.buffers.push(buffer);
        SurfaceHandle((self.buffers.len() - 1) as u32)
    }

    pub fn get(&self, handle: SurfaceHandle) -> Option<&PixelBuffer> {
        self.buffers.get(handle.0 as usize)
    }

    pub fn get_mut(&mut self, handle: SurfaceHandle) -> Option<&mut PixelBuffer> {
        self.buffers.get_mut(handle.0 as usize)
    }

    /// Borrow one surface immutably and another mutably.
    ///
    /// Returns `None` if either handle is unknown or both name the same surface.
    pub fn pair_mut(
        &mut self,
        read: SurfaceHandle,
        write: SurfaceHandle,
    ) -> Option<(&PixelBuffer, &mut PixelBuffer)> {
        let (r, w) = (read.0 as usize, write.0 as usize);
        if r == w || r >= self.buffers.len() || w >= self.buffers.len() {
            return None;
        }
        if r < w {
            let (head, tail) = self.buffers.split_at_mut(w);
            Some((&head[r], &mut tail[0]))
        } else {
            let (head, tail) = self.buffers.split_at_mut(r);
            Some((&tail[0], &mut head[w]))
        }
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }
}

impl Default for Surfaces {
    fn default() -> Self {
        Self::new()
    }
}

/// Executes a finalized command buffer.
///
/// Implementations must process slots in ascending order up to `count`,
/// resolving upload handles through `surfaces`.
pub trait DisplayBackend {
    type Error: std::error::Error + 'static;

    fn submit(&mut self, commands: &[u32], surfaces: &Surfaces) -> Result<(), Self::Error>;
}
