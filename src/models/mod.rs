use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod db_operations;
pub mod listing_query;
pub mod workflow;

/// A stored document paired with its public identifier.
///
/// Documents are persisted without their own id; the key they live under is
/// turned into the canonical hyphenated UUID string when the record is read
/// back, and flattened next to the document fields in JSON output.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Record<T> {
    pub id: String,
    #[serde(flatten)]
    pub data: T,
}

pub type Listing = Record<ListingData>;
pub type Post = Record<PostData>;
pub type Comment = Record<CommentData>;
pub type AdminLogEntry = Record<AdminLogData>;
pub type JobOffer = Record<JobOfferData>;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModerationStatus {
    #[default]
    #[serde(rename = "pendente")]
    Pending,
    #[serde(rename = "aprovado")]
    Approved,
    #[serde(rename = "rejeitado")]
    Rejected,
}

impl fmt::Display for ModerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ModerationStatus::Pending => "pendente",
            ModerationStatus::Approved => "aprovado",
            ModerationStatus::Rejected => "rejeitado",
        };
        f.write_str(label)
    }
}

/// A business entry in the directory ("empresa").
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct ListingData {
    #[serde(rename = "nome")]
    pub name: String,
    pub slug: String,
    #[serde(rename = "descricao", default)]
    pub description: Option<String>,
    #[serde(rename = "categoria_id", default)]
    pub category_id: Option<String>,
    #[serde(rename = "bairro", default)]
    pub neighborhood: Option<String>,
    #[serde(rename = "endereco", default)]
    pub address: Option<String>,
    #[serde(rename = "cidade", default)]
    pub city: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(flatten)]
    pub contact: ContactInfo,
    #[serde(default)]
    pub logo: Option<String>,
    /// The first image doubles as the banner.
    #[serde(rename = "imagens", default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(rename = "user_id", default)]
    pub owner_id: Option<String>,
    pub status: ModerationStatus,
    #[serde(rename = "ativa")]
    pub active: bool,
    #[serde(rename = "destaque")]
    pub featured: bool,
    #[serde(rename = "motivo_bloqueio", default)]
    pub block_reason: Option<String>,
    #[serde(rename = "motivo_rejeicao", default)]
    pub rejection_reason: Option<String>,
    #[serde(rename = "visualizacoes", default)]
    pub views: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ListingData {
    pub fn is_publicly_visible(&self) -> bool {
        self.status == ModerationStatus::Approved && self.active
    }

    pub fn is_blocked(&self) -> bool {
        self.status == ModerationStatus::Approved && !self.active
    }

    pub fn banner(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct ContactInfo {
    #[serde(rename = "telefone", default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub whatsapp: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "site", default)]
    pub website: Option<String>,
    #[serde(default)]
    pub instagram: Option<String>,
    #[serde(default)]
    pub facebook: Option<String>,
}

/// A community noticeboard submission ("mural").
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct PostData {
    #[serde(rename = "user_id")]
    pub author_id: String,
    #[serde(rename = "autor_nome")]
    pub author_name: String,
    #[serde(rename = "autor_bairro", default)]
    pub author_neighborhood: Option<String>,
    #[serde(rename = "empresa_id", default)]
    pub listing_id: Option<String>,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "conteudo")]
    pub body: String,
    #[serde(rename = "imagens", default)]
    pub images: Vec<String>,
    #[serde(rename = "bairro", default)]
    pub neighborhood: Option<String>,
    #[serde(rename = "logradouro", default)]
    pub street: Option<String>,
    pub status: ModerationStatus,
    #[serde(rename = "data_aprovacao", default)]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(rename = "admin_aprovador_id", default)]
    pub approved_by: Option<String>,
    #[serde(rename = "motivo_rejeicao", default)]
    pub rejection_reason: Option<String>,
    #[serde(rename = "curtidas", default)]
    pub likes: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CommentData {
    pub post_id: String,
    #[serde(rename = "user_id")]
    pub author_id: String,
    #[serde(rename = "autor_nome")]
    pub author_name: String,
    #[serde(rename = "conteudo")]
    pub body: String,
    #[serde(rename = "curtidas", default)]
    pub likes: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AdminLogData {
    pub admin_id: String,
    #[serde(rename = "acao")]
    pub action: String,
    #[serde(rename = "entidade_tipo")]
    pub entity_type: String,
    #[serde(rename = "entidade_id")]
    pub entity_id: String,
    #[serde(rename = "detalhes")]
    pub details: String,
    pub created_at: DateTime<Utc>,
}

/// A job offer published by a listing ("vaga").
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct JobOfferData {
    #[serde(rename = "empresa_id")]
    pub listing_id: String,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "tipo")]
    pub kind: String,
    #[serde(rename = "salario", default)]
    pub salary: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An account as exposed over the API; the credential never leaves the store.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct UserAccount {
    pub id: String,
    pub email: String,
    #[serde(rename = "nome")]
    pub name: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq, Default)]
pub struct DirectoryStats {
    pub empresas_ativas: usize,
    pub empresas_bloqueadas: usize,
    pub empresas_pendentes: usize,
    pub total_empresas: usize,
    pub posts_pendentes: usize,
    pub posts_aprovados: usize,
    pub posts_rejeitados: usize,
    pub total_posts: usize,
    pub total_usuarios: usize,
    pub total_admins: usize,
}

// Codes written to the admin log by server-side moderation.
pub mod admin_actions {
    pub const APPROVE_LISTING: &str = "aprovar_empresa";
    pub const REJECT_LISTING: &str = "rejeitar_empresa";
    pub const BLOCK_LISTING: &str = "bloquear_empresa";
    pub const UNBLOCK_LISTING: &str = "desbloquear_empresa";
    pub const FEATURE_LISTING: &str = "destacar_empresa";
    pub const DELETE_LISTING: &str = "excluir_empresa";
    pub const APPROVE_POST: &str = "aprovar_post";
    pub const REJECT_POST: &str = "rejeitar_post";
    pub const DELETE_POST: &str = "excluir_post";
    pub const TOGGLE_ADMIN: &str = "alternar_admin";
    pub const DELETE_USER: &str = "excluir_usuario";
}
