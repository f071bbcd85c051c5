//! Little-endian binary framing shared by the tree and ray stream formats.

use crate::bounding_volume::Box3;
use crate::math::{Point, Real, Vector};
use crate::shape::Triangle;
use crate::utils::ClosedInterval;
use std::io::{self, Read, Write};

/// The integer terminating every binary stream.
pub const END_SENTINEL: i32 = 9215;

/// Error returned when reading a binary tree or ray stream.
#[derive(thiserror::Error, Debug)]
pub enum FormatError {
    /// The underlying reader or writer failed.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    /// The stream did not end with [`END_SENTINEL`].
    #[error("expected the end sentinel {sentinel}, found {0}", sentinel = END_SENTINEL)]
    MissingSentinel(i32),
    /// The decoded tree is not strictly binary.
    #[error("read {branches} branches for {leaves} leaves")]
    BranchLeafMismatch {
        /// The number of branches read.
        branches: usize,
        /// The number of leaves read.
        leaves: usize,
    },
    /// A node header is not one of the known tags.
    #[error("unexpected node tag {0}")]
    UnknownNodeTag(i32),
    /// A ray record has an unknown kind.
    #[error("unexpected ray kind {0}")]
    UnknownRayKind(i32),
    /// A leaf declares a negative number of triangles.
    #[error("negative triangle count {0}")]
    NegativeCount(i32),
}

pub(crate) fn read_i32(reader: &mut impl Read) -> io::Result<i32> {
    let mut bytes = [0; 4];
    reader.read_exact(&mut bytes)?;
    Ok(i32::from_le_bytes(bytes))
}

pub(crate) fn read_f32(reader: &mut impl Read) -> io::Result<Real> {
    let mut bytes = [0; 4];
    reader.read_exact(&mut bytes)?;
    Ok(Real::from_le_bytes(bytes))
}

pub(crate) fn read_vector(reader: &mut impl Read) -> io::Result<Vector<Real>> {
    Ok(Vector::new(
        read_f32(reader)?,
        read_f32(reader)?,
        read_f32(reader)?,
    ))
}

pub(crate) fn read_point(reader: &mut impl Read) -> io::Result<Point<Real>> {
    read_vector(reader).map(Point::from)
}

/// Reads `min_x, max_x, min_y, max_y, min_z, max_z`.
pub(crate) fn read_box(reader: &mut impl Read) -> io::Result<Box3> {
    let mut axis = || -> io::Result<ClosedInterval> {
        Ok(ClosedInterval::new(read_f32(reader)?, read_f32(reader)?))
    };
    Ok(Box3::new(axis()?, axis()?, axis()?))
}

pub(crate) fn read_triangle(reader: &mut impl Read) -> io::Result<Triangle> {
    Ok(Triangle::new(
        read_point(reader)?,
        read_point(reader)?,
        read_point(reader)?,
    ))
}

pub(crate) fn write_i32(writer: &mut impl Write, value: i32) -> io::Result<()> {
    writer.write_all(&value.to_le_bytes())
}

pub(crate) fn write_f32(writer: &mut impl Write, value: Real) -> io::Result<()> {
    writer.write_all(&value.to_le_bytes())
}

pub(crate) fn write_vector(writer: &mut impl Write, v: &Vector<Real>) -> io::Result<()> {
    v.iter().try_for_each(|c| write_f32(writer, *c))
}

pub(crate) fn write_box(writer: &mut impl Write, bbox: &Box3) -> io::Result<()> {
    for axis in 0..3 {
        let range = bbox.axis(axis);
        write_f32(writer, range.min)?;
        write_f32(writer, range.max)?;
    }
    Ok(())
}

pub(crate) fn write_triangle(writer: &mut impl Write, triangle: &Triangle) -> io::Result<()> {
    triangle
        .coords()
        .iter()
        .try_for_each(|c| write_f32(writer, *c))
}

/// Reads the trailing sentinel of a stream.
pub(crate) fn expect_sentinel(reader: &mut impl Read) -> Result<(), FormatError> {
    match read_i32(reader)? {
        END_SENTINEL => Ok(()),
        other => Err(FormatError::MissingSentinel(other)),
    }
}
