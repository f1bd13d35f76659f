// src/client/commands/geo.rs

use crate::client::Client;
use crate::core::commands::geospatial::{self, GeoMember, GeoUnit};
use crate::core::errors::ClientError;
use crate::core::protocol::convert;
use bytes::Bytes;

impl Client {
    pub async fn geoadd(
        &self,
        key: impl Into<Bytes>,
        members: Vec<GeoMember>,
    ) -> Result<i64, ClientError> {
        convert::into_int(self.dispatch(geospatial::geoadd(key, members)).await?)
    }

    pub async fn geopos(
        &self,
        key: impl Into<Bytes>,
        members: Vec<Bytes>,
    ) -> Result<Vec<Option<(f64, f64)>>, ClientError> {
        convert::into_geo_positions(self.dispatch(geospatial::geopos(key, members)).await?)
    }

    pub async fn geodist(
        &self,
        key: impl Into<Bytes>,
        member_a: impl Into<Bytes>,
        member_b: impl Into<Bytes>,
        unit: GeoUnit,
    ) -> Result<Option<f64>, ClientError> {
        convert::into_optional_float(
            self.dispatch(geospatial::geodist(key, member_a, member_b, unit))
                .await?,
        )
    }

    pub async fn geosearch_from_member(
        &self,
        key: impl Into<Bytes>,
        member: impl Into<Bytes>,
        radius: f64,
        unit: GeoUnit,
    ) -> Result<Vec<Bytes>, ClientError> {
        convert::into_bytes_array(
            self.dispatch(geospatial::geosearch_from_member(key, member, radius, unit))
                .await?,
        )
    }
}
