// src/core/commands/geospatial.rs

//! Constructors for the geospatial command family.

use super::Cmd;
use bytes::Bytes;
use strum_macros::{Display, EnumString};

/// Distance units accepted by the geo commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum GeoUnit {
    M,
    Km,
    Mi,
    Ft,
}

/// One member with its coordinates for `GEOADD`.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoMember {
    pub longitude: f64,
    pub latitude: f64,
    pub member: Bytes,
}

pub fn geoadd(key: impl Into<Bytes>, members: Vec<GeoMember>) -> Cmd {
    let key = key.into();
    let mut cmd = Cmd::write("GEOADD").by_key(&key).arg(key);
    for m in members {
        cmd = cmd
            .arg_float(m.longitude)
            .arg_float(m.latitude)
            .arg(m.member);
    }
    cmd
}

pub fn geopos(key: impl Into<Bytes>, members: Vec<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::read("GEOPOS").by_key(&key).arg(key).args(members)
}

pub fn geodist(
    key: impl Into<Bytes>,
    member_a: impl Into<Bytes>,
    member_b: impl Into<Bytes>,
    unit: GeoUnit,
) -> Cmd {
    let key = key.into();
    Cmd::read("GEODIST")
        .by_key(&key)
        .arg(key)
        .arg(member_a.into())
        .arg(member_b.into())
        .arg(unit.to_string())
}

/// `GEOSEARCH key FROMMEMBER member BYRADIUS radius unit ASC`.
pub fn geosearch_from_member(
    key: impl Into<Bytes>,
    member: impl Into<Bytes>,
    radius: f64,
    unit: GeoUnit,
) -> Cmd {
    let key = key.into();
    Cmd::read("GEOSEARCH")
        .by_key(&key)
        .arg(key)
        .arg("FROMMEMBER")
        .arg(member.into())
        .arg("BYRADIUS")
        .arg_float(radius)
        .arg(unit.to_string())
        .arg("ASC")
}
