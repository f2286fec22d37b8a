use indicatif::{ProgressBar, ProgressStyle};

pub(crate) fn progress_spin_until_done<R>(msg: &'static str, func: impl FnOnce() -> R) -> R {
    let progress_bar = ProgressBar::new_spinner()
        .with_style(ProgressStyle::default_bar().template("{msg}: {elapsed:>10} {spinner:.green}"));
    progress_bar.set_message(msg);
    progress_bar.enable_steady_tick(100);
    let res = func();
    progress_bar.finish();
    res
}

pub(crate) fn progress_bar(msg: &'static str, len: usize) -> ProgressBar {
    let progress_bar = ProgressBar::new(len as u64).with_style(
        ProgressStyle::default_bar()
            .template("{msg}: [{bar:43.green}] {percent:>3}% ({pos:>7}/{len:>7})")
            .progress_chars("=> "),
    );
    progress_bar.set_message(msg);
    progress_bar
}
