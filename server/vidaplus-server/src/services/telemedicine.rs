use uuid::Uuid;

pub const TELEMEDICINE_BASE_URL: &str = "https://telemedicine.vidaplus.com";

/// Joining link for a freshly created virtual room
#[must_use]
pub fn telemedicine_link() -> String {
    let room = Uuid::new_v4().simple().to_string();
    let room = room.get(..12).unwrap_or(&room);
    format!("{TELEMEDICINE_BASE_URL}/room/room_{room}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn links_point_at_unique_rooms() {
        let first = telemedicine_link();
        let second = telemedicine_link();

        assert!(first.starts_with("https://telemedicine.vidaplus.com/room/room_"));
        assert_eq!(first.len(), TELEMEDICINE_BASE_URL.len() + "/room/room_".len() + 12);
        assert_ne!(first, second);
    }
}
