//! Fixed-capacity native buffers and the factory that allocates them.
//!
//! A [`NativeBuffer`] is a zero-initialised, contiguous block of plain-old-data
//! elements with a read/write cursor. Its byte view uses the platform's native
//! byte order. Capacity is fixed at allocation; writes past the limit are
//! rejected instead of truncated or wrapped.

use crate::{TransformError, TransformResult};
use bytemuck::{Pod, Zeroable};

/// Buffer of signed 16-bit samples.
pub type ShortBuffer = NativeBuffer<i16>;
/// Buffer of 32-bit floats.
pub type FloatBuffer = NativeBuffer<f32>;

/// Fixed-capacity buffer with a cursor.
///
/// The cursor follows the usual `0 <= position <= limit <= capacity` rule.
/// Relative operations (`put*`, `take*`, `next_mut`) start at `position` and
/// advance it.
#[derive(Debug, PartialEq)]
pub struct NativeBuffer<T: Pod> {
    data: Box<[T]>,
    position: usize,
    limit: usize,
}

impl<T: Pod> NativeBuffer<T> {
    /// Total number of elements.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Size of the backing storage in bytes.
    pub fn byte_capacity(&self) -> usize {
        std::mem::size_of_val(&*self.data)
    }

    /// Index of the next element to read or write.
    pub const fn position(&self) -> usize {
        self.position
    }

    /// First index that relative operations may not touch.
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Elements between the cursor and the limit.
    pub const fn remaining(&self) -> usize {
        self.limit - self.position
    }

    /// Reset the cursor to the start and the limit to the capacity.
    ///
    /// Contents are left untouched.
    pub fn clear(&mut self) {
        self.position = 0;
        self.limit = self.data.len();
    }

    /// Set the limit to the cursor and the cursor to zero, ready to read back
    /// what was just written.
    pub fn flip(&mut self) {
        self.limit = self.position;
        self.position = 0;
    }

    /// Move the cursor back to zero, keeping the limit.
    pub fn rewind(&mut self) {
        self.position = 0;
    }

    /// Write all of `src` at the cursor.
    ///
    /// Fails without writing anything if `src` does not fit before the limit.
    pub fn put_slice(&mut self, src: &[T]) -> TransformResult<()> {
        self.next_mut(src.len())?.copy_from_slice(src);
        Ok(())
    }

    /// Borrow the next `count` elements for reading and advance past them.
    pub fn take(&mut self, count: usize) -> TransformResult<&[T]> {
        let range = self.advance("take", count)?;
        Ok(&self.data[range])
    }

    /// Borrow the next `count` elements for writing and advance past them.
    pub fn next_mut(&mut self, count: usize) -> TransformResult<&mut [T]> {
        let range = self.advance("put", count)?;
        Ok(&mut self.data[range])
    }

    /// Whole backing storage, ignoring the cursor.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Whole backing storage, ignoring the cursor.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Backing storage as native-order bytes.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    /// Copy the whole backing storage into a new, independently owned vector.
    pub fn to_vec(&self) -> Vec<T> {
        self.data.to_vec()
    }

    fn advance(&mut self, operation: &'static str, count: usize) -> TransformResult<std::ops::Range<usize>> {
        if count > self.remaining() {
            return Err(TransformError::misuse(
                operation,
                format!(
                    "{count} elements requested but only {} remain (position {}, limit {})",
                    self.remaining(),
                    self.position,
                    self.limit
                ),
            ));
        }
        let start = self.position;
        self.position += count;
        Ok(start..self.position)
    }
}

/// The single allocation path for pipeline buffers.
///
/// Every buffer it returns is zero-initialised, has exactly the requested
/// capacity and owns its storage.
pub struct NativeBufferFactory;

impl NativeBufferFactory {
    /// Allocate a zeroed buffer of `elements` values of `T`.
    ///
    /// # Errors
    /// [`TransformError::Allocation`] if the memory cannot be reserved.
    pub fn allocate<T: Pod>(elements: usize) -> TransformResult<NativeBuffer<T>> {
        let mut data: Vec<T> = Vec::new();
        data.try_reserve_exact(elements)
            .map_err(|_| TransformError::allocation::<T>(elements))?;
        data.resize(elements, <T as Zeroable>::zeroed());
        tracing::trace!(
            element = std::any::type_name::<T>(),
            elements,
            "allocated native buffer"
        );
        Ok(NativeBuffer {
            data: data.into_boxed_slice(),
            position: 0,
            limit: elements,
        })
    }

    /// Allocate a buffer holding a copy of `src`.
    ///
    /// The cursor is left at zero, so the contents are ready to be read.
    pub fn from_slice<T: Pod>(src: &[T]) -> TransformResult<NativeBuffer<T>> {
        let mut buffer = Self::allocate::<T>(src.len())?;
        buffer.as_mut_slice().copy_from_slice(src);
        Ok(buffer)
    }

    /// Allocate a zeroed short buffer.
    pub fn allocate_shorts(elements: usize) -> TransformResult<ShortBuffer> {
        Self::allocate(elements)
    }

    /// Allocate a zeroed float buffer.
    pub fn allocate_floats(elements: usize) -> TransformResult<FloatBuffer> {
        Self::allocate(elements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocation_is_zeroed_with_exact_capacity() {
        let floats = NativeBufferFactory::allocate_floats(513).unwrap();
        assert_eq!(floats.capacity(), 513);
        assert_eq!(floats.byte_capacity(), 513 * 4);
        assert_eq!(floats.position(), 0);
        assert_eq!(floats.limit(), 513);
        assert!(floats.as_slice().iter().all(|&v| v == 0.0));

        let shorts = NativeBufferFactory::allocate_shorts(1024).unwrap();
        assert_eq!(shorts.byte_capacity(), 2048);

        let bytes = NativeBufferFactory::allocate::<u8>(7).unwrap();
        assert_eq!(bytes.byte_capacity(), 7);

        let staged = NativeBufferFactory::from_slice::<u8>(&[1, 2, 3]).unwrap();
        assert_eq!(staged.as_bytes(), &[1, 2, 3]);
    }

    #[test]
    fn test_buffers_do_not_alias() {
        let mut a = NativeBufferFactory::allocate_shorts(4).unwrap();
        let b = NativeBufferFactory::allocate_shorts(4).unwrap();
        a.put_slice(&[1, 2, 3, 4]).unwrap();
        assert_eq!(b.as_slice(), &[0, 0, 0, 0]);
    }

    #[test]
    fn test_prefilled_buffer() {
        let mut buffer = NativeBufferFactory::from_slice(&[1.0f32, 2.0, 3.0]).unwrap();
        assert_eq!(buffer.position(), 0);
        assert_eq!(buffer.take(1).unwrap(), &[1.0]);
        assert_eq!(buffer.take(2).unwrap(), &[2.0, 3.0]);
        assert_eq!(buffer.remaining(), 0);
        assert!(buffer.take(1).is_err());
    }

    #[test]
    fn test_native_byte_order() {
        let buffer = NativeBufferFactory::from_slice(&[0x0102i16]).unwrap();
        assert_eq!(buffer.as_bytes(), &0x0102i16.to_ne_bytes());
    }

    #[test]
    fn test_put_beyond_limit_is_rejected() {
        let mut buffer = NativeBufferFactory::allocate_shorts(4).unwrap();
        buffer.put_slice(&[1, 2, 3]).unwrap();
        let err = buffer.put_slice(&[4, 5]).unwrap_err();
        assert!(matches!(err, TransformError::Misuse { operation: "put", .. }));
        // Nothing was written and the cursor did not move
        assert_eq!(buffer.position(), 3);
        assert_eq!(buffer.as_slice(), &[1, 2, 3, 0]);
    }

    #[test]
    fn test_cursor_operations() {
        let mut buffer = NativeBufferFactory::allocate_shorts(8).unwrap();
        buffer.put_slice(&[5, 6, 7]).unwrap();
        buffer.flip();
        assert_eq!(buffer.limit(), 3);
        assert_eq!(buffer.remaining(), 3);
        assert_eq!(buffer.take(3).unwrap(), &[5, 6, 7]);

        buffer.rewind();
        assert_eq!(buffer.position(), 0);
        assert_eq!(buffer.limit(), 3);
        assert!(buffer.next_mut(4).is_err());

        buffer.clear();
        assert_eq!(buffer.limit(), 8);
        // clear keeps the contents
        assert_eq!(&buffer.as_slice()[..3], &[5, 6, 7]);
    }

    #[test]
    fn test_zero_capacity_buffer() {
        let mut buffer = NativeBufferFactory::allocate_floats(0).unwrap();
        assert_eq!(buffer.capacity(), 0);
        assert!(buffer.put_slice(&[]).is_ok());
        assert!(buffer.put_slice(&[1.0]).is_err());
    }

    #[test]
    fn test_allocation_failure_is_reported() {
        let err = NativeBufferFactory::allocate_floats(usize::MAX).unwrap_err();
        assert!(matches!(
            err,
            TransformError::Allocation { element: "f32", elements: usize::MAX }
        ));
        assert!(err.is_fatal());

        let err = NativeBufferFactory::allocate::<i16>(isize::MAX as usize).unwrap_err();
        assert!(matches!(err, TransformError::Allocation { .. }));
    }
}
