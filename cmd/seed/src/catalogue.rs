/// (title, description, tags) for the sample catalogue.
pub const SAMPLE_IDEAS: &[(&str, &str, &[&str])] = &[
    (
        "EcoTrack",
        "A mobile app that helps users track their carbon footprint through daily activities and offers personalized suggestions to reduce environmental impact.",
        &["sustainability", "climate-tech", "mobile-app"],
    ),
    (
        "MindfulMinutes",
        "An AI-powered meditation platform that adapts sessions based on your mood, stress levels, and available time.",
        &["mental-health", "wellness", "ai"],
    ),
    (
        "LocalEats Collective",
        "A platform connecting local farms directly to consumers through a subscription model with weekly boxes of seasonal produce.",
        &["food-tech", "subscription", "sustainability"],
    ),
    (
        "CodeBuddy AI",
        "An AI pair programming assistant that explains concepts, reviews code quality and suggests refactoring inside the editor.",
        &["developer-tools", "ai", "productivity"],
    ),
    (
        "SeniorConnect",
        "A simplified communication platform for seniors with large text interfaces, voice commands, photo sharing and automated check-ins.",
        &["eldercare", "social", "health-tech"],
    ),
    (
        "SkillSwap",
        "A time-banking platform where users teach what they know and learn what they want using time credits instead of money.",
        &["education", "community", "sharing-economy"],
    ),
    (
        "NutriScan",
        "A mobile app that scans food products and gives nutritional insights based on your dietary goals and restrictions.",
        &["health-tech", "nutrition", "mobile-app"],
    ),
    (
        "RentalRights",
        "A platform helping renters understand their legal rights, with document templates and affordable access to tenant lawyers.",
        &["legal-tech", "housing", "consumer-rights"],
    ),
    (
        "WasteNoMore",
        "A smart trash bin that automatically sorts recyclables, compostables and landfill waste, paired with a progress-tracking app.",
        &["smart-home", "sustainability", "hardware"],
    ),
    (
        "MicroLearn",
        "Five-minute micro-learning courses designed for short breaks, optimized for retention through spaced repetition.",
        &["education", "productivity", "microlearning"],
    ),
    (
        "PetPals",
        "A neighborhood pet-sitting exchange where owners trade pet care with trusted neighbors, including verification and health profiles.",
        &["pets", "sharing-economy", "community"],
    ),
    (
        "UrbanGrow",
        "A modular, soil-less indoor gardening system for small apartments that grows vegetables and herbs year-round.",
        &["food-tech", "sustainability", "smart-home"],
    ),
    (
        "CommunityPower",
        "A platform enabling neighborhoods to build renewable energy microgrids where residents invest in, share and trade energy.",
        &["cleantech", "energy", "community"],
    ),
    (
        "CultureBridge",
        "A language learning platform pairing learners with native speakers who share their interests for natural conversation practice.",
        &["education", "language-learning", "cultural-exchange"],
    ),
];
