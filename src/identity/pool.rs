//! Curated symbol pool for reader identifiers

/// Symbols a reader identifier is drawn from.
///
/// Every entry is a single extended grapheme cluster. A handful of entries
/// carry a trailing variation selector (U+FE0F) and so span two code points.
pub const EMOJI_POOL: &[&str] = &[
    // Animals
    "🐶", "🐱", "🐭", "🐹", "🐰", "🦊", "🐻", "🐼", "🐨", "🐯",
    "🦁", "🐮", "🐷", "🐸", "🐵", "🐔", "🐧", "🐦", "🐤", "🦆",
    "🦅", "🦉", "🦇", "🐺", "🐴", "🦄", "🐝", "🦋", "🐞", "🐢",
    "🐍", "🦎", "🦖", "🦕", "🐙", "🦑", "🦐", "🦀", "🐡", "🐠",
    "🐟", "🐬", "🐳", "🐋", "🦈", "🐊", "🐅", "🐆", "🦓", "🦍",
    "🐘", "🦛", "🐪", "🐫", "🦒", "🦘", "🐃", "🐄", "🐎", "🐖",
    "🐏", "🐑", "🦙", "🐐", "🦌", "🐕", "🐩", "🐈", "🐓", "🦃",
    "🦚", "🦜", "🦢", "🦩", "🐇", "🦝", "🦦", "🦥", "🐿️", "🦔",
    // Plants, sky and weather
    "🌵", "🎄", "🌲", "🌳", "🌴", "🌱", "🌿", "🍀", "🍁", "🍄",
    "🌾", "💐", "🌷", "🌹", "🌺", "🌸", "🌼", "🌻", "🌞", "🌝",
    "🌛", "🌜", "🌚", "🌕", "🌙", "⭐", "🌟", "⚡", "🔥", "🌈",
    "☀️", "⛅", "❄️", "☃️", "⛄", "💧", "🌊",
    // Food
    "🍏", "🍎", "🍐", "🍊", "🍋", "🍌", "🍉", "🍇", "🍓", "🍈",
    "🍒", "🍑", "🥭", "🍍", "🥥", "🥝", "🍅", "🥑", "🥦", "🥕",
    "🌽", "🥐", "🥯", "🍞", "🧀", "🥚", "🥞", "🧇", "🍕", "🍔",
    "🍟", "🌭", "🥪", "🌮", "🍿", "🧁", "🍰", "🎂", "🍭", "🍬",
    "🍫", "🍩", "🍪",
    // Toys, games, music and vehicles
    "⚽", "🏀", "🏈", "⚾", "🎾", "🏐", "🎱", "🏓", "🪁", "🛹",
    "🎨", "🎭", "🎪", "🎸", "🎺", "🎻", "🥁", "🎹", "🎲", "🧩",
    "🚀", "🚁", "🚂", "🚲", "🛴", "⛵", "🚗", "🚌", "🚒", "🚜",
    "🎈", "🎁", "🎀", "🪀", "🔑", "✏️", "📚", "🔔", "🧸", "💎",
];
