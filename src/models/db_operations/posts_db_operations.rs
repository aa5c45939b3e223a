use crate::models::db_operations::{
    decode_row, id_to_string, insert_document, load_document, modify_document, parse_id, put_document,
    read_document, scan_documents, DbError, COMENTARIOS, POSTS, POST_COMMENTS_INDEX,
};
use crate::models::{Comment, CommentData, Post, PostData, Record};
use redb::{Database, ReadableTable};
use uuid::Uuid;

// ====================================================================
// ============================ POSTS =================================
// ====================================================================

pub fn create_post(db: &Database, post: PostData) -> Result<Post, DbError> {
    insert_document(db, POSTS, post)
}

pub fn read_post(db: &Database, id: &str) -> Result<Option<Post>, DbError> {
    read_document(db, POSTS, id)
}

/// All posts, newest first.
pub fn read_all_posts(db: &Database) -> Result<Vec<Post>, DbError> {
    let mut posts: Vec<Post> = scan_documents(db, POSTS)?;
    posts.sort_by(|a, b| b.data.created_at.cmp(&a.data.created_at));
    Ok(posts)
}

pub fn update_post<E, F>(db: &Database, id: &str, mutate: F) -> Result<Option<Post>, E>
where
    E: From<DbError>,
    F: FnOnce(&mut PostData) -> Result<(), E>,
{
    modify_document(db, POSTS, id, mutate)
}

/// Removes a post together with every comment attached to it.
/// Returns the removed post and how many comments went with it.
pub fn delete_post(db: &Database, id: &str) -> Result<Option<(Post, usize)>, DbError> {
    let post_id_bytes = parse_id(id)?;
    let write_txn = db.begin_write()?;

    let post: Option<PostData> = load_document(&write_txn, POSTS, &post_id_bytes)?;
    let post = match post {
        Some(post) => post,
        None => {
            write_txn.abort()?;
            return Ok(None);
        }
    };

    let removed_comments = {
        let mut posts = write_txn.open_table(POSTS)?;
        posts.remove(&post_id_bytes)?;

        let mut index = write_txn.open_table(POST_COMMENTS_INDEX)?;
        let start_key = (&post_id_bytes, i64::MIN, &[0u8; 16]);
        let end_key = (&post_id_bytes, i64::MAX, &[255u8; 16]);

        let mut keys: Vec<(i64, [u8; 16])> = Vec::new();
        for item_result in index.range(start_key..=end_key)? {
            let (key, _) = item_result?;
            let (_, created, comment_id) = key.value();
            keys.push((created, *comment_id));
        }

        let mut comments = write_txn.open_table(COMENTARIOS)?;
        for (created, comment_id) in &keys {
            comments.remove(comment_id)?;
            index.remove((&post_id_bytes, *created, comment_id))?;
        }
        keys.len()
    };
    write_txn.commit()?;

    Ok(Some((Record { id: id_to_string(&post_id_bytes), data: post }, removed_comments)))
}

// ====================================================================
// ========================== COMMENTS ================================
// ====================================================================

/// Stores a comment and indexes it under its parent post. Fails with
/// `NotFound` when the post does not exist.
pub fn create_comment(db: &Database, comment: CommentData) -> Result<Comment, DbError> {
    let post_id_bytes = parse_id(&comment.post_id)?;
    let comment_uuid = Uuid::new_v4();
    let comment_id_bytes = comment_uuid.into_bytes();

    let write_txn = db.begin_write()?;
    let parent: Option<PostData> = load_document(&write_txn, POSTS, &post_id_bytes)?;
    if parent.is_none() {
        write_txn.abort()?;
        return Err(DbError::NotFound(format!("post {}", comment.post_id)));
    }

    put_document(&write_txn, COMENTARIOS, &comment_id_bytes, &comment)?;
    {
        let mut index = write_txn.open_table(POST_COMMENTS_INDEX)?;
        let created = comment.created_at.timestamp_micros();
        index.insert((&post_id_bytes, created, &comment_id_bytes), ())?;
    }
    write_txn.commit()?;

    Ok(Record { id: comment_uuid.to_string(), data: comment })
}

pub fn read_comment(db: &Database, id: &str) -> Result<Option<Comment>, DbError> {
    read_document(db, COMENTARIOS, id)
}

/// Comments of one post, oldest first.
pub fn read_comments_for_post(db: &Database, post_id: &str) -> Result<Vec<Comment>, DbError> {
    let post_id_bytes = parse_id(post_id)?;
    let read_txn = db.begin_read()?;
    let index = read_txn.open_table(POST_COMMENTS_INDEX)?;
    let comments_table = read_txn.open_table(COMENTARIOS)?;

    let start_key = (&post_id_bytes, i64::MIN, &[0u8; 16]);
    let end_key = (&post_id_bytes, i64::MAX, &[255u8; 16]);

    let mut comments = Vec::new();
    for item_result in index.range(start_key..=end_key)? {
        let (key, _) = item_result?;
        let comment_id_bytes = key.value().2;
        match comments_table.get(comment_id_bytes)? {
            Some(json) => comments.extend(decode_row(comment_id_bytes, json.value())),
            None => log::warn!("Comment index points at missing comment '{}'", id_to_string(comment_id_bytes)),
        }
    }
    Ok(comments)
}

pub fn update_comment<E, F>(db: &Database, id: &str, mutate: F) -> Result<Option<Comment>, E>
where
    E: From<DbError>,
    F: FnOnce(&mut CommentData) -> Result<(), E>,
{
    modify_document(db, COMENTARIOS, id, mutate)
}

pub fn delete_comment(db: &Database, id: &str) -> Result<bool, DbError> {
    let comment_id_bytes = parse_id(id)?;
    let write_txn = db.begin_write()?;
    let comment: Option<CommentData> = load_document(&write_txn, COMENTARIOS, &comment_id_bytes)?;
    let existed = match &comment {
        Some(comment) => {
            let mut comments = write_txn.open_table(COMENTARIOS)?;
            comments.remove(&comment_id_bytes)?;
            let post_id_bytes = parse_id(&comment.post_id)?;
            let mut index = write_txn.open_table(POST_COMMENTS_INDEX)?;
            index.remove((&post_id_bytes, comment.created_at.timestamp_micros(), &comment_id_bytes))?;
            true
        }
        None => false,
    };
    write_txn.commit()?;
    Ok(existed)
}
