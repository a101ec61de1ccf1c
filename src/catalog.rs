//! Canonical block text catalog.
//!
//! Maps opcodes of the standard Scratch palette to their canonical block
//! text, with input slots written as `%s` (string/menu), `%n` (number),
//! `%b` (boolean) and `%d` (dropdown) placeholders. The catalog is the
//! textual ground truth the entity extractor renders display labels from;
//! opcodes outside the table fall back to [`derive_block_text`].

/// Canonical text for an opcode of the standard palette, if known.
pub fn block_text(opcode: &str) -> Option<&'static str> {
    let text = match opcode {
        // Motion
        "motion_movesteps" => "move %n steps",
        "motion_turnright" => "turn right %n degrees",
        "motion_turnleft" => "turn left %n degrees",
        "motion_goto" => "go to %s",
        "motion_gotoxy" => "go to x: %n y: %n",
        "motion_glideto" => "glide %n secs to %s",
        "motion_glidesecstoxy" => "glide %n secs to x: %n y: %n",
        "motion_pointindirection" => "point in direction %n",
        "motion_pointtowards" => "point towards %s",
        "motion_changexby" => "change x by %n",
        "motion_setx" => "set x to %n",
        "motion_changeyby" => "change y by %n",
        "motion_sety" => "set y to %n",
        "motion_ifonedgebounce" => "if on edge, bounce",
        "motion_setrotationstyle" => "set rotation style %s",
        "motion_xposition" => "x position",
        "motion_yposition" => "y position",
        "motion_direction" => "direction",
        // Looks
        "looks_sayforsecs" => "say %s for %n seconds",
        "looks_say" => "say %s",
        "looks_thinkforsecs" => "think %s for %n seconds",
        "looks_think" => "think %s",
        "looks_switchcostumeto" => "switch costume to %s",
        "looks_nextcostume" => "next costume",
        "looks_switchbackdropto" => "switch backdrop to %s",
        "looks_switchbackdroptoandwait" => "switch backdrop to %s and wait",
        "looks_nextbackdrop" => "next backdrop",
        "looks_changesizeby" => "change size by %n",
        "looks_setsizeto" => "set size to %n",
        "looks_changeeffectby" => "change %s effect by %n",
        "looks_seteffectto" => "set %s effect to %n",
        "looks_cleargraphiceffects" => "clear graphic effects",
        "looks_show" => "show",
        "looks_hide" => "hide",
        "looks_gotofrontback" => "go to %s layer",
        "looks_goforwardbackwardlayers" => "go %s %n layers",
        "looks_costumenumbername" => "costume %s",
        "looks_backdropnumbername" => "backdrop %s",
        "looks_size" => "size",
        // Sound
        "sound_playuntildone" => "play sound %s until done",
        "sound_play" => "start sound %s",
        "sound_stopallsounds" => "stop all sounds",
        "sound_changeeffectby" => "change %s effect by %n",
        "sound_seteffectto" => "set %s effect to %n",
        "sound_cleareffects" => "clear sound effects",
        "sound_changevolumeby" => "change volume by %n",
        "sound_setvolumeto" => "set volume to %n",
        "sound_volume" => "volume",
        // Events
        "event_whenflagclicked" => "when green flag clicked",
        "event_whenkeypressed" => "when %s key pressed",
        "event_whenthisspriteclicked" => "when this sprite clicked",
        "event_whenstageclicked" => "when stage clicked",
        "event_whenbackdropswitchesto" => "when backdrop switches to %s",
        "event_whengreaterthan" => "when %s > %n",
        "event_whenbroadcastreceived" => "when I receive %s",
        "event_broadcast" => "broadcast %s",
        "event_broadcastandwait" => "broadcast %s and wait",
        // Control
        "control_wait" => "wait %n seconds",
        "control_repeat" => "repeat %n",
        "control_forever" => "forever",
        "control_if" => "if %b then",
        "control_if_else" => "if %b then else",
        "control_wait_until" => "wait until %b",
        "control_repeat_until" => "repeat until %b",
        "control_stop" => "stop %s",
        "control_start_as_clone" => "when I start as a clone",
        "control_create_clone_of" => "create clone of %s",
        "control_delete_this_clone" => "delete this clone",
        // Sensing
        "sensing_touchingobject" => "touching %s",
        "sensing_touchingcolor" => "touching color %s",
        "sensing_coloristouchingcolor" => "color %s is touching %s",
        "sensing_distanceto" => "distance to %s",
        "sensing_askandwait" => "ask %s and wait",
        "sensing_answer" => "answer",
        "sensing_keypressed" => "key %s pressed",
        "sensing_mousedown" => "mouse down",
        "sensing_mousex" => "mouse x",
        "sensing_mousey" => "mouse y",
        "sensing_setdragmode" => "set drag mode %s",
        "sensing_loudness" => "loudness",
        "sensing_timer" => "timer",
        "sensing_resettimer" => "reset timer",
        "sensing_of" => "%s of %s",
        "sensing_current" => "current %s",
        "sensing_dayssince2000" => "days since 2000",
        "sensing_username" => "username",
        // Operators
        "operator_add" => "%n + %n",
        "operator_subtract" => "%n - %n",
        "operator_multiply" => "%n * %n",
        "operator_divide" => "%n / %n",
        "operator_random" => "pick random %n to %n",
        "operator_gt" => "%s > %s",
        "operator_lt" => "%s < %s",
        "operator_equals" => "%s = %s",
        "operator_and" => "%b and %b",
        "operator_or" => "%b or %b",
        "operator_not" => "not %b",
        "operator_join" => "join %s %s",
        "operator_letter_of" => "letter %n of %s",
        "operator_length" => "length of %s",
        "operator_contains" => "%s contains %s",
        "operator_mod" => "%n mod %n",
        "operator_round" => "round %n",
        "operator_mathop" => "%s of %n",
        // Data (the variable/list reporters themselves are rendered from
        // their referenced name by the extractor, not from this table)
        "data_showvariable" => "show variable %s",
        "data_hidevariable" => "hide variable %s",
        "data_addtolist" => "add %s to %s",
        "data_deleteoflist" => "delete %n of %s",
        "data_deletealloflist" => "delete all of %s",
        "data_insertatlist" => "insert %s at %n of %s",
        "data_replaceitemoflist" => "replace item %n of %s with %s",
        "data_itemoflist" => "item %n of %s",
        "data_itemnumoflist" => "item # of %s in %s",
        "data_lengthoflist" => "length of %s",
        "data_listcontainsitem" => "%s contains %s",
        "data_showlist" => "show list %s",
        "data_hidelist" => "hide list %s",
        // Pen extension
        "pen_clear" => "erase all",
        "pen_stamp" => "stamp",
        "pen_penDown" => "pen down",
        "pen_penUp" => "pen up",
        "pen_setPenColorToColor" => "set pen color to %s",
        "pen_changePenSizeBy" => "change pen size by %n",
        "pen_setPenSizeTo" => "set pen size to %n",
        // Music extension
        "music_playDrumForBeats" => "play drum %s for %n beats",
        "music_restForBeats" => "rest for %n beats",
        "music_playNoteForBeats" => "play note %n for %n beats",
        "music_setInstrument" => "set instrument to %s",
        "music_setTempo" => "set tempo to %n",
        "music_changeTempo" => "change tempo by %n",
        "music_getTempo" => "tempo",
        _ => return None,
    };
    Some(text)
}

/// Fallback text for opcodes outside the catalog: the opcode tail with
/// underscores opened up, e.g. `videoSensing_videoToggle` → "videoToggle".
pub fn derive_block_text(opcode: &str) -> String {
    let tail = opcode.split_once('_').map(|(_, t)| t).unwrap_or(opcode);
    tail.replace('_', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_hit() {
        assert_eq!(block_text("motion_movesteps"), Some("move %n steps"));
        assert_eq!(block_text("event_whenflagclicked"), Some("when green flag clicked"));
        assert_eq!(block_text("operator_join"), Some("join %s %s"));
    }

    #[test]
    fn test_catalog_miss() {
        assert_eq!(block_text("videoSensing_videoToggle"), None);
        assert_eq!(block_text(""), None);
    }

    #[test]
    fn test_derive_block_text() {
        assert_eq!(derive_block_text("event_broadcast_menu"), "broadcast menu");
        assert_eq!(derive_block_text("plainopcode"), "plainopcode");
    }
}
