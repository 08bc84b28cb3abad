//! Protocol mappers of client scopes and clients

use async_trait::async_trait;

use crate::config::segment;
use crate::error::ValidationError;
use crate::models::ProtocolMapper;
use crate::request::KcRequest;
use crate::response::KcResponse;
use crate::validation::{require, require_access};

use super::Api;

/// Entity the protocol mappers belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapperOwner<'a> {
    ClientScope(&'a str),
    Client(&'a str),
}

impl MapperOwner<'_> {
    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::ClientScope(id) => require(id, "clientScopeId"),
            Self::Client(id) => require(id, "clientId"),
        }
    }

    fn protocol_mappers_path(&self) -> String {
        match self {
            Self::ClientScope(id) => format!("client-scopes/{}/protocol-mappers", segment(id)),
            Self::Client(id) => format!("clients/{}/protocol-mappers", segment(id)),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::ClientScope(_) => "realm client scope",
            Self::Client(_) => "client level",
        }
    }
}

#[async_trait]
pub trait ProtocolMappersApi: Send + Sync {
    /// No request is sent when `mappers` is empty.
    async fn add_mappers(
        &self,
        realm: &str,
        access_token: &str,
        owner: MapperOwner<'_>,
        mappers: &[ProtocolMapper],
    ) -> Result<KcResponse<()>, ValidationError>;

    async fn add_mapper(
        &self,
        realm: &str,
        access_token: &str,
        owner: MapperOwner<'_>,
        mapper: &ProtocolMapper,
    ) -> Result<KcResponse<()>, ValidationError>;

    async fn list(
        &self,
        realm: &str,
        access_token: &str,
        owner: MapperOwner<'_>,
    ) -> Result<KcResponse<Vec<ProtocolMapper>>, ValidationError>;

    async fn get(
        &self,
        realm: &str,
        access_token: &str,
        owner: MapperOwner<'_>,
        mapper_id: &str,
    ) -> Result<KcResponse<ProtocolMapper>, ValidationError>;

    async fn update(
        &self,
        realm: &str,
        access_token: &str,
        owner: MapperOwner<'_>,
        mapper_id: &str,
        mapper: &ProtocolMapper,
    ) -> Result<KcResponse<()>, ValidationError>;

    async fn delete(
        &self,
        realm: &str,
        access_token: &str,
        owner: MapperOwner<'_>,
        mapper_id: &str,
    ) -> Result<KcResponse<()>, ValidationError>;

    async fn list_by_protocol(
        &self,
        realm: &str,
        access_token: &str,
        owner: MapperOwner<'_>,
        protocol: &str,
    ) -> Result<KcResponse<Vec<ProtocolMapper>>, ValidationError>;
}

pub struct ProtocolMappers {
    api: Api,
}

impl ProtocolMappers {
    pub(crate) fn new(api: Api) -> Self {
        Self { api }
    }

    fn url(&self, realm: &str, owner: MapperOwner<'_>, suffix: &str) -> String {
        self.api
            .admin(realm, &format!("{}{suffix}", owner.protocol_mappers_path()))
    }

    fn model_url(&self, realm: &str, owner: MapperOwner<'_>, mapper_id: &str) -> String {
        self.url(realm, owner, &format!("/models/{}", segment(mapper_id)))
    }
}

fn validate_owner(
    realm: &str,
    access_token: &str,
    owner: MapperOwner<'_>,
) -> Result<(), ValidationError> {
    require_access(realm, access_token)?;
    owner.validate()
}

#[async_trait]
impl ProtocolMappersApi for ProtocolMappers {
    async fn add_mappers(
        &self,
        realm: &str,
        access_token: &str,
        owner: MapperOwner<'_>,
        mappers: &[ProtocolMapper],
    ) -> Result<KcResponse<()>, ValidationError> {
        validate_owner(realm, access_token, owner)?;
        if mappers.is_empty() {
            return Ok(KcResponse::default());
        }

        Ok(self
            .api
            .send_empty(
                KcRequest::post(self.url(realm, owner, "/add-models"))
                    .bearer(access_token)
                    .json(mappers),
                &format!("Unable to add {} protocol mappers", owner.label()),
            )
            .await)
    }

    async fn add_mapper(
        &self,
        realm: &str,
        access_token: &str,
        owner: MapperOwner<'_>,
        mapper: &ProtocolMapper,
    ) -> Result<KcResponse<()>, ValidationError> {
        validate_owner(realm, access_token, owner)?;

        Ok(self
            .api
            .send_empty(
                KcRequest::post(self.url(realm, owner, "/models"))
                    .bearer(access_token)
                    .json(mapper),
                &format!("Unable to add {} protocol mapper", owner.label()),
            )
            .await)
    }

    async fn list(
        &self,
        realm: &str,
        access_token: &str,
        owner: MapperOwner<'_>,
    ) -> Result<KcResponse<Vec<ProtocolMapper>>, ValidationError> {
        validate_owner(realm, access_token, owner)?;

        Ok(self
            .api
            .send(
                KcRequest::get(self.url(realm, owner, "/models")).bearer(access_token),
                &format!("Unable to list {} protocol mappers", owner.label()),
            )
            .await)
    }

    async fn get(
        &self,
        realm: &str,
        access_token: &str,
        owner: MapperOwner<'_>,
        mapper_id: &str,
    ) -> Result<KcResponse<ProtocolMapper>, ValidationError> {
        validate_owner(realm, access_token, owner)?;
        require(mapper_id, "mapperId")?;

        Ok(self
            .api
            .send(
                KcRequest::get(self.model_url(realm, owner, mapper_id)).bearer(access_token),
                &format!("Unable to get {} protocol mapper", owner.label()),
            )
            .await)
    }

    async fn update(
        &self,
        realm: &str,
        access_token: &str,
        owner: MapperOwner<'_>,
        mapper_id: &str,
        mapper: &ProtocolMapper,
    ) -> Result<KcResponse<()>, ValidationError> {
        validate_owner(realm, access_token, owner)?;
        require(mapper_id, "mapperId")?;

        Ok(self
            .api
            .send_empty(
                KcRequest::put(self.model_url(realm, owner, mapper_id))
                    .bearer(access_token)
                    .json(mapper),
                &format!("Unable to update {} protocol mapper", owner.label()),
            )
            .await)
    }

    async fn delete(
        &self,
        realm: &str,
        access_token: &str,
        owner: MapperOwner<'_>,
        mapper_id: &str,
    ) -> Result<KcResponse<()>, ValidationError> {
        validate_owner(realm, access_token, owner)?;
        require(mapper_id, "mapperId")?;

        Ok(self
            .api
            .send_empty(
                KcRequest::delete(self.model_url(realm, owner, mapper_id)).bearer(access_token),
                &format!("Unable to delete {} protocol mapper", owner.label()),
            )
            .await)
    }

    async fn list_by_protocol(
        &self,
        realm: &str,
        access_token: &str,
        owner: MapperOwner<'_>,
        protocol: &str,
    ) -> Result<KcResponse<Vec<ProtocolMapper>>, ValidationError> {
        validate_owner(realm, access_token, owner)?;
        require(protocol, "protocolName")?;

        let suffix = format!("/protocol/{}", segment(protocol));
        Ok(self
            .api
            .send(
                KcRequest::get(self.url(realm, owner, &suffix)).bearer(access_token),
                &format!("Unable to list {} protocol mappers by protocol name", owner.label()),
            )
            .await)
    }
}
