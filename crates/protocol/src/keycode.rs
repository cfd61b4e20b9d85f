//! Android to Linux key code translation
//!
//! Left column: `android/keycodes.h`. Right column:
//! `linux/input-event-codes.h`. Codes missing from the table have no host
//! equivalent and are dropped by the caller.

/// Host key codes (`linux/input-event-codes.h`)
pub mod host {
    pub const KEY_ESC: u16 = 1;
    pub const KEY_1: u16 = 2;
    pub const KEY_2: u16 = 3;
    pub const KEY_3: u16 = 4;
    pub const KEY_4: u16 = 5;
    pub const KEY_5: u16 = 6;
    pub const KEY_6: u16 = 7;
    pub const KEY_7: u16 = 8;
    pub const KEY_8: u16 = 9;
    pub const KEY_9: u16 = 10;
    pub const KEY_0: u16 = 11;
    pub const KEY_MINUS: u16 = 12;
    pub const KEY_EQUAL: u16 = 13;
    pub const KEY_BACKSPACE: u16 = 14;
    pub const KEY_TAB: u16 = 15;
    pub const KEY_Q: u16 = 16;
    pub const KEY_W: u16 = 17;
    pub const KEY_E: u16 = 18;
    pub const KEY_R: u16 = 19;
    pub const KEY_T: u16 = 20;
    pub const KEY_Y: u16 = 21;
    pub const KEY_U: u16 = 22;
    pub const KEY_I: u16 = 23;
    pub const KEY_O: u16 = 24;
    pub const KEY_P: u16 = 25;
    pub const KEY_LEFTBRACE: u16 = 26;
    pub const KEY_RIGHTBRACE: u16 = 27;
    pub const KEY_ENTER: u16 = 28;
    pub const KEY_LEFTCTRL: u16 = 29;
    pub const KEY_A: u16 = 30;
    pub const KEY_S: u16 = 31;
    pub const KEY_D: u16 = 32;
    pub const KEY_F: u16 = 33;
    pub const KEY_G: u16 = 34;
    pub const KEY_H: u16 = 35;
    pub const KEY_J: u16 = 36;
    pub const KEY_K: u16 = 37;
    pub const KEY_L: u16 = 38;
    pub const KEY_SEMICOLON: u16 = 39;
    pub const KEY_APOSTROPHE: u16 = 40;
    pub const KEY_LEFTSHIFT: u16 = 42;
    pub const KEY_BACKSLASH: u16 = 43;
    pub const KEY_Z: u16 = 44;
    pub const KEY_X: u16 = 45;
    pub const KEY_C: u16 = 46;
    pub const KEY_V: u16 = 47;
    pub const KEY_B: u16 = 48;
    pub const KEY_N: u16 = 49;
    pub const KEY_M: u16 = 50;
    pub const KEY_COMMA: u16 = 51;
    pub const KEY_DOT: u16 = 52;
    pub const KEY_SLASH: u16 = 53;
    pub const KEY_RIGHTSHIFT: u16 = 54;
    pub const KEY_LEFTALT: u16 = 56;
    pub const KEY_SPACE: u16 = 57;
    pub const KEY_CAPSLOCK: u16 = 58;
    pub const KEY_F1: u16 = 59;
    pub const KEY_F2: u16 = 60;
    pub const KEY_F3: u16 = 61;
    pub const KEY_F4: u16 = 62;
    pub const KEY_F5: u16 = 63;
    pub const KEY_F6: u16 = 64;
    pub const KEY_F7: u16 = 65;
    pub const KEY_F8: u16 = 66;
    pub const KEY_F9: u16 = 67;
    pub const KEY_F10: u16 = 68;
    pub const KEY_NUMLOCK: u16 = 69;
    pub const KEY_SCROLLLOCK: u16 = 70;
    pub const KEY_F11: u16 = 87;
    pub const KEY_F12: u16 = 88;
    pub const KEY_RIGHTCTRL: u16 = 97;
    pub const KEY_SYSRQ: u16 = 99;
    pub const KEY_RIGHTALT: u16 = 100;
    pub const KEY_UP: u16 = 103;
    pub const KEY_PAGEUP: u16 = 104;
    pub const KEY_LEFT: u16 = 105;
    pub const KEY_RIGHT: u16 = 106;
    pub const KEY_DOWN: u16 = 108;
    pub const KEY_PAGEDOWN: u16 = 109;
    pub const KEY_INSERT: u16 = 110;
    pub const KEY_FORWARD: u16 = 159;
    pub const KEY_BREAK: u16 = 0x19b;
    pub const KEY_NUMERIC_0: u16 = 0x200;
    pub const KEY_NUMERIC_1: u16 = 0x201;
    pub const KEY_NUMERIC_2: u16 = 0x202;
    pub const KEY_NUMERIC_3: u16 = 0x203;
    pub const KEY_NUMERIC_4: u16 = 0x204;
    pub const KEY_NUMERIC_5: u16 = 0x205;
    pub const KEY_NUMERIC_6: u16 = 0x206;
    pub const KEY_NUMERIC_7: u16 = 0x207;
    pub const KEY_NUMERIC_8: u16 = 0x208;
    pub const KEY_NUMERIC_9: u16 = 0x209;
}

use host::*;

/// (Android key code, host key code), sorted by Android key code
pub const KEYCODE_TABLE: &[(u16, u16)] = &[
    // digits
    (7, KEY_0),
    (8, KEY_1),
    (9, KEY_2),
    (10, KEY_3),
    (11, KEY_4),
    (12, KEY_5),
    (13, KEY_6),
    (14, KEY_7),
    (15, KEY_8),
    (16, KEY_9),
    // d-pad
    (19, KEY_UP),
    (20, KEY_DOWN),
    (21, KEY_LEFT),
    (22, KEY_RIGHT),
    // letters
    (29, KEY_A),
    (30, KEY_B),
    (31, KEY_C),
    (32, KEY_D),
    (33, KEY_E),
    (34, KEY_F),
    (35, KEY_G),
    (36, KEY_H),
    (37, KEY_I),
    (38, KEY_J),
    (39, KEY_K),
    (40, KEY_L),
    (41, KEY_M),
    (42, KEY_N),
    (43, KEY_O),
    (44, KEY_P),
    (45, KEY_Q),
    (46, KEY_R),
    (47, KEY_S),
    (48, KEY_T),
    (49, KEY_U),
    (50, KEY_V),
    (51, KEY_W),
    (52, KEY_X),
    (53, KEY_Y),
    (54, KEY_Z),
    (55, KEY_COMMA),
    (56, KEY_DOT),
    (57, KEY_LEFTALT),
    (58, KEY_RIGHTALT),
    (59, KEY_LEFTSHIFT),
    (60, KEY_RIGHTSHIFT),
    (61, KEY_TAB),
    (62, KEY_SPACE),
    (66, KEY_ENTER),
    (67, KEY_BACKSPACE),
    (69, KEY_MINUS),
    (70, KEY_EQUAL),
    (71, KEY_LEFTBRACE),
    (72, KEY_RIGHTBRACE),
    (73, KEY_BACKSLASH),
    (74, KEY_SEMICOLON),
    (75, KEY_APOSTROPHE),
    (76, KEY_SLASH),
    (92, KEY_PAGEUP),
    (93, KEY_PAGEDOWN),
    (111, KEY_ESC),
    (113, KEY_LEFTCTRL),
    (114, KEY_RIGHTCTRL),
    (115, KEY_CAPSLOCK),
    (116, KEY_SCROLLLOCK),
    (120, KEY_SYSRQ),
    (121, KEY_BREAK),
    (124, KEY_INSERT),
    (125, KEY_FORWARD),
    // function keys
    (131, KEY_F1),
    (132, KEY_F2),
    (133, KEY_F3),
    (134, KEY_F4),
    (135, KEY_F5),
    (136, KEY_F6),
    (137, KEY_F7),
    (138, KEY_F8),
    (139, KEY_F9),
    (140, KEY_F10),
    (141, KEY_F11),
    (142, KEY_F12),
    // numeric pad
    (143, KEY_NUMLOCK),
    (144, KEY_NUMERIC_0),
    (145, KEY_NUMERIC_1),
    (146, KEY_NUMERIC_2),
    (147, KEY_NUMERIC_3),
    (148, KEY_NUMERIC_4),
    (149, KEY_NUMERIC_5),
    (150, KEY_NUMERIC_6),
    (151, KEY_NUMERIC_7),
    (152, KEY_NUMERIC_8),
    (153, KEY_NUMERIC_9),
];

/// Host key code for an Android key code, `None` if there is no mapping
pub fn translate(android_key_code: u16) -> Option<u16> {
    KEYCODE_TABLE
        .binary_search_by_key(&android_key_code, |&(android, _)| android)
        .ok()
        .map(|i| KEYCODE_TABLE[i].1)
}

/// Every host key code the table can produce
pub fn host_key_codes() -> impl Iterator<Item = u16> {
    KEYCODE_TABLE.iter().map(|&(_, host)| host)
}
