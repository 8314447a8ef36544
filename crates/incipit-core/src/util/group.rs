/// Split `items` into maximal runs of adjacent elements sharing a key.
pub fn group_adjacent<T, K, F>(items: &[T], key_selector: F) -> Vec<&[T]>
where
    K: PartialEq,
    F: Fn(&T) -> K,
{
    let mut groups = Vec::new();
    let mut start = 0;

    for i in 1..=items.len() {
        if i == items.len() || key_selector(&items[i]) != key_selector(&items[start]) {
            groups.push(&items[start..i]);
            start = i;
        }
    }

    groups
}
