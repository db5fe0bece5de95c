//! Banner image repository.

use crate::model::banner::{BannerId, BannerImage};
use crate::repo::{ensure_tables, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

pub trait BannerRepository {
    /// Records one stored banner file and returns the new row.
    fn create_banner(&self, banner_image: &str, uploaded_at: i64) -> RepoResult<BannerImage>;
    /// Lists banners newest first.
    fn list_banners(&self) -> RepoResult<Vec<BannerImage>>;
    fn get_banner(&self, id: BannerId) -> RepoResult<Option<BannerImage>>;
}

pub struct SqliteBannerRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBannerRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["banner_images"])?;
        Ok(Self { conn })
    }
}

impl BannerRepository for SqliteBannerRepository<'_> {
    fn create_banner(&self, banner_image: &str, uploaded_at: i64) -> RepoResult<BannerImage> {
        self.conn.execute(
            "INSERT INTO banner_images (banner_image, uploaded_at) VALUES (?1, ?2);",
            params![banner_image, uploaded_at],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_banner(id)?
            .ok_or_else(|| RepoError::InvalidData(format!("banner {id} missing after insert")))
    }

    fn list_banners(&self) -> RepoResult<Vec<BannerImage>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, banner_image, uploaded_at
             FROM banner_images
             ORDER BY uploaded_at DESC, id DESC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut banners = Vec::new();
        while let Some(row) = rows.next()? {
            banners.push(parse_banner_row(row)?);
        }
        Ok(banners)
    }

    fn get_banner(&self, id: BannerId) -> RepoResult<Option<BannerImage>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, banner_image, uploaded_at
             FROM banner_images
             WHERE id = ?1;",
        )?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_banner_row(row)?)),
            None => Ok(None),
        }
    }
}

fn parse_banner_row(row: &Row<'_>) -> RepoResult<BannerImage> {
    Ok(BannerImage {
        id: row.get("id")?,
        banner_image: row.get("banner_image")?,
        uploaded_at: row.get("uploaded_at")?,
    })
}
