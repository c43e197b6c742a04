//! Procedural stand-ins for everything the model services would otherwise produce.

use crate::chat::ChatReply;
use crate::models::{Gender, Profile, new_id};
use rand::Rng;
use rand::seq::IndexedRandom;

pub const MIN_AGE: u8 = 23;
pub const MAX_AGE: u8 = 38;

const WOMEN_NAMES: &[&str] = &[
    "Emma", "Olivia", "Ava", "Sophia", "Mia", "Isabella", "Chloe", "Zoe", "Nora", "Lily",
    "Hannah", "Grace", "Maya", "Leah", "Elena",
];

const MEN_NAMES: &[&str] = &[
    "Liam", "Noah", "Ethan", "Lucas", "Mason", "Logan", "James", "Daniel", "Owen", "Caleb",
    "Mateo", "Julian", "Theo", "Adrian", "Ryan",
];

const LOCATIONS: &[&str] = &[
    "Brooklyn, NY",
    "Austin, TX",
    "Portland, OR",
    "Denver, CO",
    "Chicago, IL",
    "Seattle, WA",
    "San Diego, CA",
    "Nashville, TN",
    "Boston, MA",
    "Miami, FL",
];

pub const INTERESTS: &[&str] = &[
    "Hiking",
    "Cooking",
    "Photography",
    "Travel",
    "Yoga",
    "Live music",
    "Board games",
    "Coffee",
    "Reading",
    "Running",
    "Painting",
    "Wine tasting",
    "Dancing",
    "Movies",
    "Gaming",
    "Climbing",
    "Surfing",
    "Dogs",
    "Gardening",
    "Podcasts",
];

const BIO_OPENERS: &[&str] = &[
    "Adventure seeker with a soft spot for spontaneous road trips.",
    "Part-time optimist, full-time snack enthusiast.",
    "Looking for someone to share bad puns and good food with.",
    "Just moved here and still finding my favorite spots.",
    "Equal parts homebody and explorer.",
    "Professional overthinker, amateur chef.",
];

const BIO_CLOSERS: &[&str] = &[
    "Swipe right if you know a great brunch place.",
    "Tell me your most unpopular opinion.",
    "Let's grab a coffee and see where it goes.",
    "Bonus points if you can make me laugh.",
    "Looking for my partner in crime.",
    "Ask me about my last trip.",
];

const REPLIES: &[&str] = &[
    "Haha, that's so true! What else do you like to do for fun?",
    "I love that! Tell me more.",
    "That sounds amazing. I've always wanted to try that.",
    "You're pretty funny, you know that? 😄",
    "Honestly same. What's your go-to weekend plan?",
    "Ooh, interesting! How did you get into that?",
    "I was just thinking about that earlier, no joke.",
    "Okay, you've got my attention. What's next?",
    "That's a great question... let me think about it 🤔",
    "We should definitely grab a drink sometime and talk about it!",
];

const OPENERS: &[&str] = &[
    "Hey! Glad we matched 😊",
    "Hi there! Your profile made me smile.",
    "Well hello! How's your day going?",
    "Hey you! So what's your story?",
];

pub fn random_profile() -> Profile {
    random_profile_with(&mut rand::rng())
}

pub fn random_profile_with<R: Rng + ?Sized>(rng: &mut R) -> Profile {
    let gender = if rng.random_bool(0.5) {
        Gender::Woman
    } else {
        Gender::Man
    };
    let names = match gender {
        Gender::Woman => WOMEN_NAMES,
        Gender::Man => MEN_NAMES,
    };
    let interest_count = rng.random_range(3..=5);
    let interests: Vec<String> = INTERESTS
        .choose_multiple(rng, interest_count)
        .map(|s| s.to_string())
        .collect();

    Profile {
        id: new_id(),
        name: pick(rng, names).to_string(),
        age: rng.random_range(MIN_AGE..=MAX_AGE),
        gender,
        location: pick(rng, LOCATIONS).to_string(),
        bio: random_bio_with(rng, &interests),
        image_url: random_photo_url_with(rng, gender),
        interests,
    }
}

pub fn random_bio(interests: &[String]) -> String {
    random_bio_with(&mut rand::rng(), interests)
}

pub fn random_bio_with<R: Rng + ?Sized>(rng: &mut R, interests: &[String]) -> String {
    let mut bio = pick(rng, BIO_OPENERS).to_string();
    let lowered: Vec<String> = interests.iter().map(|i| i.to_lowercase()).collect();
    match lowered.as_slice() {
        [] => {}
        [only] => bio.push_str(&format!(" Big fan of {}.", only)),
        [rest @ .., last] => {
            bio.push_str(&format!(" Into {} and {}.", rest.join(", "), last));
        }
    }
    bio.push(' ');
    bio.push_str(pick(rng, BIO_CLOSERS));
    bio
}

pub fn random_reply() -> ChatReply {
    random_reply_with(&mut rand::rng())
}

pub fn random_reply_with<R: Rng + ?Sized>(rng: &mut R) -> ChatReply {
    ChatReply::text(pick(rng, REPLIES))
}

pub fn random_opener() -> String {
    pick(&mut rand::rng(), OPENERS).to_string()
}

/// Keyword photo from a public service; the URL is not checked and may 404.
pub fn random_photo_url(gender: Gender) -> String {
    random_photo_url_with(&mut rand::rng(), gender)
}

pub fn random_photo_url_with<R: Rng + ?Sized>(rng: &mut R, gender: Gender) -> String {
    format!(
        "https://loremflickr.com/400/600/portrait,{}?lock={}",
        gender.photo_keyword(),
        rng.random_range(1..=10_000u32)
    )
}

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, items: &[&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    #[test]
    fn profiles_respect_age_and_interest_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let profile = random_profile_with(&mut rng);
            assert!((MIN_AGE..=MAX_AGE).contains(&profile.age));
            assert!((3..=5).contains(&profile.interests.len()));
            let unique: HashSet<_> = profile.interests.iter().collect();
            assert_eq!(unique.len(), profile.interests.len());
            assert!(
                profile
                    .interests
                    .iter()
                    .all(|i| INTERESTS.contains(&i.as_str()))
            );
            assert!(!profile.name.is_empty());
            assert!(profile.image_url.contains(profile.gender.photo_keyword()));
        }
    }

    #[test]
    fn both_genders_and_all_interest_counts_occur() {
        let mut rng = StdRng::seed_from_u64(42);
        let profiles: Vec<Profile> = (0..200).map(|_| random_profile_with(&mut rng)).collect();
        assert!(profiles.iter().any(|p| p.gender == Gender::Woman));
        assert!(profiles.iter().any(|p| p.gender == Gender::Man));
        for n in 3..=5 {
            assert!(profiles.iter().any(|p| p.interests.len() == n));
        }
    }

    #[test]
    fn bio_weaves_in_interests() {
        let mut rng = StdRng::seed_from_u64(1);
        let interests = vec!["Hiking".to_string(), "Coffee".to_string(), "Dogs".to_string()];
        let bio = random_bio_with(&mut rng, &interests);
        assert!(bio.contains("Into hiking, coffee and dogs."));
        assert!(BIO_OPENERS.iter().any(|o| bio.starts_with(o)));
        assert!(BIO_CLOSERS.iter().any(|c| bio.ends_with(c)));

        let single = random_bio(&["Yoga".to_string()]);
        assert!(single.contains("Big fan of yoga."));
    }

    #[test]
    fn replies_are_canned_text_only() {
        let reply = random_reply();
        assert!(REPLIES.contains(&reply.text.as_str()));
        assert!(reply.image.is_none());
    }
}
