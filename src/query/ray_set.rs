//! Recorded ray queries and their binary stream format.

use crate::format::{self, FormatError};
use crate::math::{Point, Real, Vector};
use crate::query::{Ray, Segment};
use std::io::{Read, Write};

/// The outcome recorded for a ray query by the renderer that emitted it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[repr(i32)]
pub enum RayKind {
    /// A cast ray that hit something; its direction spans the distance to
    /// the hit.
    CastHit = 0,
    /// A cast ray that escaped the scene; its direction is normalized.
    CastMiss = 1,
    /// A shadow ray that was occluded.
    ShadowBroken = 2,
    /// A shadow ray that reached its target.
    ShadowConnected = 3,
}

impl RayKind {
    /// The kind with the given serialized tag.
    pub fn from_tag(tag: i32) -> Option<RayKind> {
        match tag {
            0 => Some(RayKind::CastHit),
            1 => Some(RayKind::CastMiss),
            2 => Some(RayKind::ShadowBroken),
            3 => Some(RayKind::ShadowConnected),
            _ => None,
        }
    }

    /// Is this a first-hit query?
    pub fn is_cast(self) -> bool {
        matches!(self, RayKind::CastHit | RayKind::CastMiss)
    }
}

/// A single recorded ray query.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct RayQuery {
    /// The recorded outcome.
    pub kind: RayKind,
    /// The bounce depth of the ray in the renderer.
    pub depth: i32,
    /// The origin of the ray.
    pub origin: Point<Real>,
    /// The direction of a cast ray, or the difference vector of a shadow ray.
    pub direction: Vector<Real>,
}

impl RayQuery {
    /// The query as a ray.
    pub fn ray(&self) -> Ray {
        Ray::new(self.origin, self.direction)
    }

    /// The query as a shadow query, if it is one.
    pub fn shadow(&self) -> Option<ShadowQuery> {
        let connected = match self.kind {
            RayKind::ShadowBroken => false,
            RayKind::ShadowConnected => true,
            RayKind::CastHit | RayKind::CastMiss => return None,
        };
        Some(ShadowQuery {
            segment: Segment::new(self.origin, self.direction),
            connected,
        })
    }
}

/// A shadow segment and whether the renderer found it unoccluded.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ShadowQuery {
    /// The segment between the shaded point and the light.
    pub segment: Segment,
    /// Did the segment reach the light?
    pub connected: bool,
}

/// A sequence of recorded ray queries.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct RaySet {
    /// The queries, in recording order.
    pub queries: Vec<RayQuery>,
}

impl RaySet {
    /// The first-hit queries.
    pub fn cast_queries(&self) -> impl Iterator<Item = &RayQuery> + '_ {
        self.queries.iter().filter(|q| q.kind.is_cast())
    }

    /// The shadow queries.
    pub fn shadow_queries(&self) -> impl Iterator<Item = ShadowQuery> + '_ {
        self.queries.iter().filter_map(RayQuery::shadow)
    }

    /// Reads queries until the end sentinel.
    ///
    /// Each record is `kind: i32, depth: i32`, then the origin and the
    /// direction as three `f32` each, all little-endian. The sentinel
    /// replaces the kind of the record following the last one.
    pub fn read(reader: &mut impl Read) -> Result<RaySet, FormatError> {
        let mut queries = Vec::new();

        loop {
            let tag = format::read_i32(reader)?;
            if tag == format::END_SENTINEL {
                break;
            }

            let kind = RayKind::from_tag(tag).ok_or(FormatError::UnknownRayKind(tag))?;
            let depth = format::read_i32(reader)?;
            let origin = format::read_point(reader)?;
            let direction = format::read_vector(reader)?;
            queries.push(RayQuery {
                kind,
                depth,
                origin,
                direction,
            });
        }

        log::debug!("read {} ray queries", queries.len());
        Ok(RaySet { queries })
    }

    /// Writes the queries in the format read by [`RaySet::read`].
    pub fn write(&self, writer: &mut impl Write) -> Result<(), FormatError> {
        for query in &self.queries {
            format::write_i32(writer, query.kind as i32)?;
            format::write_i32(writer, query.depth)?;
            format::write_vector(writer, &query.origin.coords)?;
            format::write_vector(writer, &query.direction)?;
        }
        format::write_i32(writer, format::END_SENTINEL)?;
        Ok(())
    }
}
