//! Authorization predicates.
//!
//! Pure functions of the signed-in user and a target entity. With no user
//! loaded every predicate is false.

use super::UserProfile;
use crate::comment::Comment;
use crate::post::Post;

pub fn can_edit_post(user: Option<&UserProfile>, post: &Post) -> bool {
    user.is_some_and(|user| user.is_staff || post.author.is_user(user))
}

pub fn can_edit_comment(user: Option<&UserProfile>, comment: &Comment) -> bool {
    user.is_some_and(|user| user.is_staff || comment.author == user.id)
}

pub fn can_moderate(user: Option<&UserProfile>) -> bool {
    user.is_some_and(|user| user.is_staff || user.is_superuser)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comment::sample_comment;
    use crate::post::{AuthorRef, sample_post};
    use crate::user::sample_user;

    #[test]
    fn test_no_user_can_do_nothing() {
        let post = sample_post(1, "hello");
        assert!(!can_edit_post(None, &post));
        assert!(!can_edit_comment(None, &sample_comment(1, None, 0)));
        assert!(!can_moderate(None));
    }

    #[test]
    fn test_owner_can_edit() {
        let owner = sample_user(7, "owner");
        let mut post = sample_post(1, "hello");
        post.author = AuthorRef::Id(7);
        assert!(can_edit_post(Some(&owner), &post));

        post.author = AuthorRef::Username("owner".to_string());
        assert!(can_edit_post(Some(&owner), &post));

        let mut comment = sample_comment(1, None, 0);
        comment.author = 7;
        assert!(can_edit_comment(Some(&owner), &comment));
        assert!(!can_moderate(Some(&owner)));
    }

    #[test]
    fn test_staff_and_superuser() {
        let mut staff = sample_user(2, "staff");
        staff.is_staff = true;
        let post = sample_post(1, "hello");
        assert!(can_edit_post(Some(&staff), &post));
        assert!(can_moderate(Some(&staff)));

        let mut root = sample_user(3, "root");
        root.is_superuser = true;
        assert!(can_moderate(Some(&root)));
        assert!(!can_edit_post(Some(&root), &post));
    }
}
