//! Drives a handful of framerate animations on the wall clock and prints
//! their lifecycle as it happens.

use std::rc::Rc;

use vizij_tween_core::{
    drive, AnimationEvent, EasingKind, FramerateSettings, Scheduler, SchedulerConfig,
    SystemTimeSource, TweenError,
};

fn main() -> Result<(), TweenError> {
    let clock = Rc::new(SystemTimeSource::new());
    let scheduler = Scheduler::new(SchedulerConfig::high_frequency(), clock.clone())?;

    let settings = FramerateSettings::from_json(
        r#"{ "delay": 0.2, "duration": 0.5, "framerate": 30, "easing": "cubic_in_out" }"#,
    )?;
    let fade = scheduler.register(settings.build()?);
    let slide = scheduler.register(
        FramerateSettings {
            duration: 0.3,
            easing: Some(EasingKind::BounceOut),
            ..Default::default()
        }
        .build()?,
    );

    for (name, animation) in [("fade", &fade), ("slide", &slide)] {
        let mut animation = animation.borrow_mut();
        for event in [
            AnimationEvent::Started,
            AnimationEvent::Updated,
            AnimationEvent::Completed,
        ] {
            animation.on_event(event, move |_, progress| {
                println!("{name:>5} {event:<9} {:.3}", progress.unwrap_or_default());
            });
        }
    }

    fade.borrow_mut().play(None);
    slide.borrow_mut().reverse(None);
    drive(&scheduler, &clock);
    Ok(())
}
