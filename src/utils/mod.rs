use uuid::Uuid;

pub mod codec;

/// 生成随机的 v4 UUID
pub fn random_uuid() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_uuid_shape() {
        let id = random_uuid();
        let groups: Vec<&str> = id.split('-').collect();
        assert_eq!(groups.iter().map(|g| g.len()).collect::<Vec<_>>(), vec![8, 4, 4, 4, 12]);
        assert!(groups[2].starts_with('4'));
        assert!(matches!(groups[3].chars().next(), Some('8' | '9' | 'a' | 'b')));
        assert_eq!(Uuid::parse_str(&id).map(|u| u.get_version_num()).ok(), Some(4));
        assert_ne!(id, random_uuid());
    }
}
